//! Handlebars templates for generated Terraform files
//!
//! Values are escaped before rendering; HTML escaping is disabled.
//! Block helpers share a line with the text they guard so no blank lines
//! leak into the output.

/// `provider "aws"` block with a literal region (flat layout)
pub const PROVIDER_LITERAL: &str = r#"provider "aws" {
  region = "{{region}}"
}

"#;

/// One `aws_kms_key` resource (flat layout)
pub const KEY_RESOURCE: &str = r#"resource "aws_kms_key" "{{name}}" {
  description              = "{{description}}"
  deletion_window_in_days  = {{deletion_window}}
  key_usage                = "{{key_usage}}"
  enable_key_rotation      = {{rotation_enabled}}
{{#if disabled}}  is_enabled               = false
{{/if}}{{#if has_multi_region}}  multi_region             = {{multi_region}}
{{/if}}{{#if key_spec}}  customer_master_key_spec = "{{key_spec}}"
{{/if}}{{#if tags}}  tags = {
{{#each tags}}    "{{key}}" = "{{value}}"
{{/each}}  }
{{/if}}  policy = <<POLICY
{{policy}}
POLICY
}

"#;

/// One `aws_kms_alias` resource (flat layout)
pub const ALIAS_RESOURCE: &str = r#"resource "aws_kms_alias" "{{name}}" {
  name          = "{{alias}}"
  target_key_id = aws_kms_key.{{key_name}}.key_id
}

"#;

/// Outputs for one key (flat layout)
pub const KEY_OUTPUTS: &str = r#"output "{{name}}_id" {
  description = "Key ID of {{key_id}}"
  value       = aws_kms_key.{{name}}.key_id
}

output "{{name}}_arn" {
  description = "ARN of {{key_id}}"
  value       = aws_kms_key.{{name}}.arn
}

"#;

/// One instantiation of the local KMS module (module layout)
pub const MODULE_INSTANCE: &str = r#"module "{{name}}" {
  source = "./modules/kms"

  description             = "{{description}}"
  deletion_window_in_days = {{deletion_window}}
  enable_key_rotation     = {{rotation_enabled}}
  is_enabled              = {{is_enabled}}
  key_usage               = "{{key_usage}}"
{{#if key_spec}}  customer_master_key_spec = "{{key_spec}}"
{{/if}}{{#if has_multi_region}}  multi_region            = {{multi_region}}
{{/if}}  aliases                 = [{{#each aliases}}{{#unless @first}}, {{/unless}}"{{this}}"{{/each}}]
{{#if tags}}  tags = {
{{#each tags}}    "{{key}}" = "{{value}}"
{{/each}}  }
{{/if}}  policy = <<POLICY
{{policy}}
POLICY
}

"#;

/// Outputs for one module instance (module layout)
pub const MODULE_OUTPUTS: &str = r#"output "{{name}}_id" {
  description = "Key ID of {{key_id}}"
  value       = module.{{name}}.key_id
}

output "{{name}}_arn" {
  description = "ARN of {{key_id}}"
  value       = module.{{name}}.key_arn
}

"#;

/// Root `variables.tf` (module layout)
pub const ROOT_VARIABLES: &str = r#"variable "aws_region" {
  description = "AWS region the imported KMS keys live in"
  type        = string
  default     = "{{region}}"
}
"#;

/// Root `terraform.tf` (module layout)
pub const TERRAFORM_SETTINGS: &str = r#"terraform {
  required_version = ">= 1.0"

  required_providers {
    {{tf_name}} = {
      source  = "{{source}}"
      version = "{{version}}"
    }
  }
}
"#;

/// Root `providers.tf` (module layout)
pub const PROVIDER_VARIABLE: &str = r#"provider "aws" {
  region = var.aws_region
}
"#;

/// `modules/kms/main.tf`
pub const MODULE_MAIN: &str = r#"resource "aws_kms_key" "this" {
  description              = var.description
  deletion_window_in_days  = var.deletion_window_in_days
  enable_key_rotation      = var.enable_key_rotation
  is_enabled               = var.is_enabled
  key_usage                = var.key_usage
  customer_master_key_spec = var.customer_master_key_spec
  multi_region             = var.multi_region
  policy                   = var.policy
  tags                     = var.tags
}

resource "aws_kms_alias" "this" {
  for_each = toset(var.aliases)

  name          = "alias/${each.value}"
  target_key_id = aws_kms_key.this.key_id
}
"#;

/// `modules/kms/variables.tf`
pub const MODULE_VARIABLES: &str = r#"variable "description" {
  description = "Description for the KMS key"
  type        = string
  default     = "KMS key managed by Terraform"
}

variable "deletion_window_in_days" {
  description = "Days to wait before deleting the key after the resource is destroyed"
  type        = number
  default     = 30
}

variable "enable_key_rotation" {
  description = "Whether automatic key rotation is enabled"
  type        = bool
  default     = true
}

variable "is_enabled" {
  description = "Whether the key is enabled"
  type        = bool
  default     = true
}

variable "key_usage" {
  description = "Intended use of the key"
  type        = string
  default     = "ENCRYPT_DECRYPT"
}

variable "customer_master_key_spec" {
  description = "Whether the key is symmetric or an asymmetric key pair, and its algorithms"
  type        = string
  default     = "SYMMETRIC_DEFAULT"
}

variable "multi_region" {
  description = "Whether the key is a multi-Region primary key"
  type        = bool
  default     = false
}

variable "policy" {
  description = "Key policy JSON document"
  type        = string
  default     = null
}

variable "aliases" {
  description = "Alias names for the key, without the alias/ prefix"
  type        = list(string)
  default     = []
}

variable "tags" {
  description = "Tags to attach to the key"
  type        = map(string)
  default     = {}
}
"#;

/// `modules/kms/outputs.tf`
pub const MODULE_OUTPUTS_FILE: &str = r#"output "key_id" {
  description = "Globally unique identifier of the key"
  value       = aws_kms_key.this.key_id
}

output "key_arn" {
  description = "ARN of the key"
  value       = aws_kms_key.this.arn
}

output "alias_arns" {
  description = "ARNs of the key aliases, by alias name"
  value       = { for name, alias in aws_kms_alias.this : name => alias.arn }
}
"#;
