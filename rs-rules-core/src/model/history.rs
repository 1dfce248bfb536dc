use std::fmt;

use serde::{Deserialize, Serialize};

/// What the generator did at one step of the walk.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Action {
	/// Unconstrained symbols drawn from the free symbols.
	Filler,

	/// An antecedent of rule `rule` was placed, followed by its consequent.
	Applied {
		/// Index of the rule in its rule set
		rule: usize,
		/// Placed because the remaining room was reserved for this rule
		forced: bool,
		/// False when the consequent was deliberately broken
		honored: bool,
	},
}

/// One entry of a rule set's generation trace.
///
/// Only used for analysis and logging, never for control flow.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Decision {
	/// Offset of the first emitted symbol
	pub position: usize,
	pub action: Action,
	/// Symbols written by this step
	pub symbols: String,
}

impl fmt::Display for Decision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.action {
			Action::Filler => write!(f, "@{} filler {}", self.position, self.symbols),
			Action::Applied { rule, forced, honored } => write!(
				f,
				"@{} rule {} {} {} {}",
				self.position,
				rule,
				if *forced { "forced" } else { "sampled" },
				if *honored { "honored" } else { "violated" },
				self.symbols
			),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display() {
		let filler = Decision { position: 0, action: Action::Filler, symbols: "BC".to_owned() };
		assert_eq!(filler.to_string(), "@0 filler BC");

		let applied = Decision {
			position: 2,
			action: Action::Applied { rule: 1, forced: true, honored: false },
			symbols: "AD".to_owned(),
		};
		assert_eq!(applied.to_string(), "@2 rule 1 forced violated AD");
	}
}
