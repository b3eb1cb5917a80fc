//! Action classification shared between signed intents and deployed actions.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What an action does, as declared by the action contract itself and
/// cross-checked against the signed intent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActionType {
    Deposit = 0,
    Withdraw = 1,
    Swap = 2,
    Borrow = 3,
    Repay = 4,
    Claim = 5,
    Transfer = 6,
    Bridge = 7,
    /// Sentinel for gas-refund actions. A sequence may contain one exactly
    /// when its chain entry enables the gas refund.
    Fee = 8,
    Custom = 9,
}

impl ActionType {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ActionType {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Deposit),
            1 => Ok(Self::Withdraw),
            2 => Ok(Self::Swap),
            3 => Ok(Self::Borrow),
            4 => Ok(Self::Repay),
            5 => Ok(Self::Claim),
            6 => Ok(Self::Transfer),
            7 => Ok(Self::Bridge),
            8 => Ok(Self::Fee),
            9 => Ok(Self::Custom),
            other => Err(TypesError::UnknownActionType(other)),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// What the signer believes an action is. Immutable once included in a signed
/// sequence; the verifier refuses to execute if the registered action no
/// longer reports the same identity.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Protocol the action belongs to, e.g. "AaveV3".
    pub protocol_name: String,
    /// Declared action classification.
    pub action_type: ActionType,
}

impl ActionDefinition {
    pub fn new(protocol_name: impl Into<String>, action_type: ActionType) -> Self {
        Self {
            protocol_name: protocol_name.into(),
            action_type,
        }
    }

    /// Whether a deployed action's self-reported identity matches this
    /// signed declaration.
    pub fn matches(&self, protocol_name: &str, action_type: ActionType) -> bool {
        self.protocol_name == protocol_name && self.action_type == action_type
    }
}

impl fmt::Display for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.protocol_name, self.action_type)
    }
}
