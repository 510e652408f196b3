//! Rules Module
//!
//! Codec for the account `Rules` setting.
//!
//! ## Responsibilities
//! - Split a serialized rule list into opaque rules (bracket-depth walk)
//! - Locate a rule by its `"#Name"` tag and read one action argument
//! - Rewrite one rule while keeping all others verbatim
//!
//! ## Rule Shape
//! ```text
//! priority,"#RuleName",(conditions...),(actions...)
//! ```

mod editor;
mod extract;
mod kind;
mod rule;

pub use editor::{edit_rules, RuleSelector, RuleTemplate, DEFAULT_SETTING};
pub use extract::{extract_rules, parse_rule_list, RULES_KEY};
pub use kind::RuleKind;
pub use rule::{Rule, RuleSet};
