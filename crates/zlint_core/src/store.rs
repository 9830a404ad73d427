//! The frozen set of rules a lint run executes.

use crate::rule::{LintRule, Rule, RuleLevel};
use crate::rules;

/// One registered rule with its configured level.
#[derive(Debug, Clone)]
pub struct ConfiguredRule {
    pub rule: Box<dyn LintRule>,
    pub level: RuleLevel,
}

/// Densely packed, ordered list of enabled rules. Built once from
/// configuration and frozen before linting begins.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    pub rules: Vec<ConfiguredRule>,
}

/// Rules keep their per-instance state small; anything bigger belongs in
/// external storage keyed by the rule id.
const EMBEDDED_STATE_CEILING: usize = 16;

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every shipped rule at its default level; rules defaulting to `off`
    /// are not registered.
    pub fn builtins(mut self) -> Self {
        for rule in rules::all() {
            let level = rule.default_level();
            if level != RuleLevel::Off {
                self.add(rule, level);
            }
        }
        self
    }

    pub fn with_rule(mut self, rule: Box<dyn LintRule>, level: RuleLevel) -> Self {
        self.add(rule, level);
        self
    }

    pub fn add(&mut self, rule: Box<dyn LintRule>, level: RuleLevel) {
        if level == RuleLevel::Off {
            return;
        }
        debug_assert!(
            std::mem::size_of_val(&*rule) <= EMBEDDED_STATE_CEILING,
            "rule `{}` carries {} bytes of embedded state, more than the {}-byte ceiling",
            rule.name(),
            std::mem::size_of_val(&*rule),
            EMBEDDED_STATE_CEILING
        );
        self.rules.push(ConfiguredRule { rule, level });
    }

    /// Replace a rule's registration, e.g. when config overrides a
    /// builtin's level or options. Setting `Off` removes it.
    pub fn set(&mut self, rule: Box<dyn LintRule>, level: RuleLevel) {
        let name = rule.name();
        self.rules.retain(|entry| entry.rule.name() != name);
        self.add(rule, level);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|entry| entry.rule.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&ConfiguredRule> {
        self.rules.iter().find(|entry| entry.rule.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfiguredRule> {
        self.rules.iter()
    }
}
