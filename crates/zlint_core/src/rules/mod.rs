//! The builtin rules, grouped by category.

pub mod compiler;
pub mod pedantic;
pub mod style;
pub mod suspicious;

pub use compiler::HomelessTry;
pub use pedantic::NoCatchReturn;
pub use style::{CaseConvention, LineLength, UnusedDecls};
pub use suspicious::SuppressedErrors;

use crate::rule::{LintRule, Rule};

/// Every shipped rule, default-configured.
pub fn all() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(HomelessTry::default()) as Box<dyn LintRule>,
        Box::new(NoCatchReturn::default()),
        Box::new(UnusedDecls::default()),
        Box::new(CaseConvention::default()),
        Box::new(LineLength::default()),
        Box::new(SuppressedErrors::default()),
    ]
}

/// Look a builtin rule up by its kebab-case name.
pub fn get_rule_by_name(name: &str) -> Option<Box<dyn LintRule>> {
    all().into_iter().find(|rule| rule.name() == name)
}

/// A "did you mean ...?" suggestion for a misspelled rule name.
pub fn get_rule_suggestion(incorrect_name: &str) -> Option<&'static str> {
    let names: Vec<&'static str> = all().iter().map(|rule| rule.name()).collect();
    crate::util::find_best_match_for_name(names.into_iter(), incorrect_name, None)
}
