//! Known rule kinds
//!
//! The two rules this client manages, in the compact form the server
//! stores them in.

use crate::protocol::unquote;
use super::{RuleSelector, RuleSet, RuleTemplate};

const VACATION_TEMPLATE: &str = r##"(2,"#Vacation",(("Human Generated","---"),(From,"not in","#RepliedAddresses")),(("Reply with","$$"),("Remember 'From' in",RepliedAddresses)))"##;

const REDIRECT_TEMPLATE: &str = r##"(1,"#Redirect",(),(("Mirror to","$$"),(Discard,"---")))"##;

/// A managed rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Auto-reply with a message, once per sender
    Vacation,

    /// Mirror every message to another address and discard the original
    Redirect,
}

impl RuleKind {
    pub fn tag(self) -> &'static str {
        match self {
            RuleKind::Vacation => "#Vacation",
            RuleKind::Redirect => "#Redirect",
        }
    }

    /// Action whose argument carries the user-facing value
    pub fn action(self) -> &'static str {
        match self {
            RuleKind::Vacation => "Reply with",
            RuleKind::Redirect => "Mirror to",
        }
    }

    pub fn selector(self) -> RuleSelector {
        RuleSelector::new(self.tag())
    }

    pub fn template(self) -> RuleTemplate {
        match self {
            RuleKind::Vacation => RuleTemplate::from_static(VACATION_TEMPLATE),
            RuleKind::Redirect => RuleTemplate::from_static(REDIRECT_TEMPLATE),
        }
    }

    /// Unescaped action argument of this kind's rule; `None` when the rule
    /// is missing or the argument is empty
    pub fn value_in(self, rules: &RuleSet) -> Option<String> {
        let raw = rules.find(&self.selector())?.action_value(self.action())?;
        let value = unquote(raw);
        (!value.is_empty()).then_some(value)
    }
}
