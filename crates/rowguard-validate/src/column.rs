//! Column compiler.
//!
//! Turns one [`ColumnDefinition`] into a [`CompiledColumn`]: a flat list of
//! coded checks, the metadata for every code it can return, and the
//! engine-side state (custom rules, uniqueness flag).
//!
//! Codes are assigned from 1 in a fixed order: `required`, then the type
//! check, then every other rule in declaration order.

use std::collections::BTreeMap;

use rowguard_model::{ColumnDefinition, ColumnType, CustomRule, ErrorKind, Rule};

use crate::codes::{MAX_CUSTOM_RULES, MAX_RULE_CODE, VALID};
use crate::error::{CompileError, Result};
use crate::locale::LocaleProvider;
use crate::rules::{
    Check, CompiledCheck, ErrorMeta, Generated, NumberParse, generate_required, generate_rule,
    generate_type_check,
};

/// Executable validator for one column.
#[derive(Debug)]
pub struct CompiledColumn {
    name: String,
    column_type: ColumnType,
    locale: Option<String>,
    checks: Vec<CompiledCheck>,
    error_meta: BTreeMap<u8, ErrorMeta>,
    has_required: bool,
    has_unique: bool,
    custom_rules: Vec<CustomRule>,
}

impl CompiledColumn {
    /// Run the compiled checks. Returns `0` when the value is valid, otherwise
    /// the code of the first failing check.
    #[inline]
    pub fn validate(&self, value: &str) -> u8 {
        for check in &self.checks {
            if let Some(code) = check.run(value) {
                return code;
            }
        }
        VALID
    }

    /// Index of the first failing custom rule, in declaration order.
    pub fn first_failing_custom(&self, value: &str) -> Option<usize> {
        self.custom_rules
            .iter()
            .position(|rule| !rule.evaluate(value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Locale the column resolved to, if any.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn has_required(&self) -> bool {
        self.has_required
    }

    pub fn has_unique(&self) -> bool {
        self.has_unique
    }

    pub fn custom_rules(&self) -> &[CustomRule] {
        &self.custom_rules
    }

    pub fn error_meta(&self, code: u8) -> Option<&ErrorMeta> {
        self.error_meta.get(&code)
    }

    pub fn error_metas(&self) -> &BTreeMap<u8, ErrorMeta> {
        &self.error_meta
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }
}

struct ColumnBuilder<'a> {
    column: &'a str,
    next_code: u8,
    checks: Vec<CompiledCheck>,
    error_meta: BTreeMap<u8, ErrorMeta>,
}

impl ColumnBuilder<'_> {
    fn allocate(&mut self, width: u8) -> Result<u8> {
        let code = self.next_code;
        let last = u16::from(code) + u16::from(width) - 1;
        if last > u16::from(MAX_RULE_CODE) {
            return Err(CompileError::TooManyChecks {
                column: self.column.to_string(),
                limit: MAX_RULE_CODE,
            });
        }
        self.next_code += width;
        Ok(code)
    }

    fn push(&mut self, generated: Generated) {
        self.error_meta
            .insert(generated.check.code, generated.meta);
        self.checks.push(generated.check);
    }
}

/// Compile one column. `default_locale` is the schema-level locale.
pub fn compile_column(
    definition: &ColumnDefinition,
    default_locale: Option<&str>,
    provider: &dyn LocaleProvider,
) -> Result<CompiledColumn> {
    let column = definition.name.as_str();
    let column_type = definition.column_type;
    let locale = definition
        .locale
        .as_deref()
        .or(default_locale)
        .map(str::to_string);

    let mut builder = ColumnBuilder {
        column,
        next_code: 1,
        checks: Vec::new(),
        error_meta: BTreeMap::new(),
    };

    let has_required = definition
        .rules
        .iter()
        .any(|rule| matches!(rule, Rule::Required));
    if has_required {
        let code = builder.allocate(1)?;
        builder.push(generate_required(code));
    }

    let mut number_parse = NumberParse::Plain;
    match locale.as_deref() {
        Some(locale) if column_type.is_locale_aware() => {
            let base = builder.next_code;
            let type_check = provider
                .type_check(column_type, locale, base)
                .ok_or_else(|| CompileError::UnsupportedLocale {
                    column: column.to_string(),
                    locale: locale.to_string(),
                    column_type,
                })?;
            let width = type_check
                .sub_errors
                .iter()
                .map(|sub| u16::from(sub.offset) + 1)
                .max()
                .ok_or_else(|| CompileError::EmptyLocaleCheck {
                    column: column.to_string(),
                    locale: locale.to_string(),
                })?;
            let width = u8::try_from(width).map_err(|_| CompileError::TooManyChecks {
                column: column.to_string(),
                limit: MAX_RULE_CODE,
            })?;
            let base = builder.allocate(width)?;
            for sub in &type_check.sub_errors {
                builder.error_meta.insert(
                    base + sub.offset,
                    ErrorMeta::new("type", ErrorKind::TypeMismatch, sub.message.clone()),
                );
            }
            if column_type == ColumnType::Number {
                number_parse = NumberParse::Locale(type_check.checker.clone());
            }
            let mut offsets: Vec<u8> = type_check.sub_errors.iter().map(|sub| sub.offset).collect();
            offsets.sort_unstable();
            offsets.dedup();
            builder.checks.push(CompiledCheck {
                check: Check::LocaleType {
                    checker: type_check.checker,
                    offsets,
                },
                code: base,
            });
        }
        _ => {
            if let Some(generated) = generate_type_check(column_type, builder.next_code) {
                builder.allocate(1)?;
                builder.push(generated);
            }
        }
    }

    let mut has_unique = false;
    let mut custom_rules = Vec::new();
    for rule in &definition.rules {
        match rule {
            Rule::Required => {}
            Rule::Unique => has_unique = true,
            Rule::Custom(custom) => custom_rules.push(custom.clone()),
            _ => {
                let code = builder.next_code;
                if let Some(generated) =
                    generate_rule(column, column_type, rule, code, &number_parse)?
                {
                    builder.allocate(1)?;
                    builder.push(generated);
                }
            }
        }
    }

    if custom_rules.len() > MAX_CUSTOM_RULES {
        return Err(CompileError::TooManyCustomRules {
            column: column.to_string(),
            count: custom_rules.len(),
            limit: MAX_CUSTOM_RULES,
        });
    }

    Ok(CompiledColumn {
        name: definition.name.clone(),
        column_type,
        locale,
        checks: builder.checks,
        error_meta: builder.error_meta,
        has_required,
        has_unique,
        custom_rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::StandardLocales;

    fn compile(definition: &ColumnDefinition, default_locale: Option<&str>) -> CompiledColumn {
        compile_column(definition, default_locale, &StandardLocales).expect("compiles")
    }

    #[test]
    fn codes_follow_required_type_then_declared_order() {
        let definition = ColumnDefinition::new("age", ColumnType::Integer)
            .rule(Rule::max(120.0))
            .rule(Rule::Unique)
            .rule(Rule::min(0.0))
            .rule(Rule::Required);
        let column = compile(&definition, None);

        let names: Vec<(u8, &str)> = column
            .error_metas()
            .iter()
            .map(|(code, meta)| (*code, meta.rule_name.as_str()))
            .collect();
        assert_eq!(
            names,
            [(1, "required"), (2, "type"), (3, "max"), (4, "min")]
        );
        assert!(column.has_required());
        assert!(column.has_unique());
        assert_eq!(column.check_count(), 4);
    }

    #[test]
    fn required_suppresses_other_checks() {
        let definition = ColumnDefinition::new("code", ColumnType::String)
            .rule(Rule::pattern("^[A-Z]+$"))
            .rule(Rule::Required);
        let column = compile(&definition, None);
        assert_eq!(column.validate(""), 1);
        assert_eq!(column.validate("abc"), 2);
        assert_eq!(column.validate("ABC"), 0);
    }

    #[test]
    fn empty_value_without_required_is_valid() {
        let definition = ColumnDefinition::new("n", ColumnType::Number).rule(Rule::min(5.0));
        let column = compile(&definition, None);
        assert_eq!(column.validate(""), 0);
        assert_eq!(column.validate("4"), 2);
    }

    #[test]
    fn locale_sub_errors_are_renumbered() {
        let definition = ColumnDefinition::new("born", ColumnType::Date)
            .rule(Rule::Required)
            .rule(Rule::max_length(10));
        let column = compile(&definition, Some("de-DE"));

        assert_eq!(column.locale(), Some("de-DE"));
        assert_eq!(column.validate(""), 1);
        assert_eq!(column.validate("2024/01/01"), 2);
        assert_eq!(column.validate("31.02.2024"), 3);
        assert_eq!(column.validate("01.02.2024"), 0);
        assert_eq!(column.error_meta(3).map(|m| m.kind), Some(ErrorKind::TypeMismatch));
        assert_eq!(
            column.error_meta(4).map(|m| m.rule_name.as_str()),
            Some("maxLength")
        );
    }

    #[test]
    fn column_locale_overrides_schema_default() {
        let definition = ColumnDefinition::new("price", ColumnType::Number)
            .with_locale("en-US")
            .rule(Rule::max(1000.0));
        let column = compile(&definition, Some("de-DE"));
        assert_eq!(column.locale(), Some("en-US"));
        assert_eq!(column.validate("999.5"), 0);
        assert_eq!(column.validate("1,000.5"), 2);
    }

    #[test]
    fn locale_number_bounds_use_locale_parse() {
        let definition = ColumnDefinition::new("price", ColumnType::Number)
            .rule(Rule::min(1000.0));
        let column = compile(&definition, Some("de-DE"));
        assert_eq!(column.validate("1.000,00"), 0);
        assert_eq!(column.validate("999,99"), 2);
    }

    #[test]
    fn overflowing_locale_number_is_a_type_error() {
        let definition = ColumnDefinition::new("amount", ColumnType::Number)
            .rule(Rule::max(1000.0));
        let column = compile(&definition, Some("de-DE"));
        let huge = "9".repeat(400);
        assert_eq!(column.validate(&huge), 1);
        assert_eq!(column.error_meta(1).map(|m| m.rule_name.as_str()), Some("type"));
    }

    #[test]
    fn non_locale_types_ignore_locale() {
        let definition = ColumnDefinition::new("qty", ColumnType::Integer);
        let column = compile(&definition, Some("de-DE"));
        assert_eq!(column.validate("1.5"), 1);
        assert_eq!(column.validate("15"), 0);
    }

    #[test]
    fn unsupported_locale_fails_compilation() {
        let definition = ColumnDefinition::new("when", ColumnType::Date).with_locale("xx-YY");
        let err = compile_column(&definition, None, &StandardLocales).expect_err("unsupported");
        assert!(matches!(err, CompileError::UnsupportedLocale { .. }));
    }

    #[test]
    fn custom_rules_keep_declaration_order() {
        let definition = ColumnDefinition::new("sku", ColumnType::String)
            .rule(Rule::custom(|v: &str| v.len() > 2, "too short"))
            .rule(Rule::custom(|v: &str| v.starts_with('S'), "must start with S"));
        let column = compile(&definition, None);
        assert_eq!(column.validate("x"), 0);
        assert_eq!(column.first_failing_custom("x"), Some(0));
        assert_eq!(column.first_failing_custom("abc"), Some(1));
        assert_eq!(column.first_failing_custom("SKU"), None);
        assert_eq!(column.check_count(), 0);
    }

    #[test]
    fn too_many_custom_rules() {
        let rules = (0..=MAX_CUSTOM_RULES).map(|_| Rule::custom(|_: &str| true, "ok"));
        let definition = ColumnDefinition::new("x", ColumnType::String).with_rules(rules);
        let err = compile_column(&definition, None, &StandardLocales).expect_err("limit");
        assert!(matches!(err, CompileError::TooManyCustomRules { count: 51, .. }));
    }

    #[test]
    fn too_many_checks() {
        let rules = (0..=usize::from(MAX_RULE_CODE)).map(Rule::max_length);
        let definition = ColumnDefinition::new("x", ColumnType::String).with_rules(rules);
        let err = compile_column(&definition, None, &StandardLocales).expect_err("limit");
        assert!(matches!(err, CompileError::TooManyChecks { .. }));
    }
}
