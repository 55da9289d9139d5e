//! Typed contract arguments and results.
//!
//! The contract speaks in loosely typed JSON arrays. Everything crossing
//! that boundary goes through [`FieldQuery`], [`ContractCall`] and the
//! `decode_*` functions here, so the rest of the crate only ever sees
//! typed values.

use super::Wei;
use crate::config::GasLimits;
use crate::error::GameError;
use crate::games::baduk::{Color, Placement, Winner};
use serde_json::{Value, json};

/// A read-only contract field or getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldQuery {
    /// `confirmed`: wager escrowed.
    Confirmed,
    /// `blackTurn`: Black is the side to move.
    BlackTurn,
    /// `approvalLock`: a claim awaits authorization.
    ApprovalLock,
    /// `draw`
    Draw,
    /// `winner`: 0 none, 1 black, 2 white.
    Winner,
    /// `size`: board dimension.
    Size,
    /// `getNumMoves`: length of the move log.
    NumMoves,
    /// `getMove(index)`: one committed move.
    Move {
        /// Position in the move log.
        index: u64,
    },
    /// `proposed`: the move awaiting authorization.
    Proposed,
}

impl FieldQuery {
    /// Contract method name.
    pub fn method(&self) -> &'static str {
        match self {
            FieldQuery::Confirmed => "confirmed",
            FieldQuery::BlackTurn => "blackTurn",
            FieldQuery::ApprovalLock => "approvalLock",
            FieldQuery::Draw => "draw",
            FieldQuery::Winner => "winner",
            FieldQuery::Size => "size",
            FieldQuery::NumMoves => "getNumMoves",
            FieldQuery::Move { .. } => "getMove",
            FieldQuery::Proposed => "proposed",
        }
    }

    /// Call parameters.
    pub fn params(&self) -> Vec<Value> {
        match self {
            FieldQuery::Move { index } => vec![json!(index)],
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for FieldQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldQuery::Move { index } => write!(f, "getMove({})", index),
            other => f.write_str(other.method()),
        }
    }
}

/// A mutating contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractCall {
    /// Escrow the opponent's wager.
    ConfirmNewGame {
        /// Value sent with the call.
        wager: Wei,
    },
    /// Propose a stone at `(x, y)`.
    ProposeMove {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// Settle a proposed move.
    AuthorizeMove {
        /// Accept or reject.
        approve: bool,
    },
    /// Offer a draw.
    ProposeDraw,
    /// Settle a draw offer.
    AuthorizeDraw {
        /// Accept or reject.
        approve: bool,
    },
    /// Claim the win.
    ProposeWinner,
    /// Settle a win claim.
    AuthorizeWinner {
        /// Accept or reject.
        approve: bool,
    },
}

impl ContractCall {
    /// Contract method name.
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::ConfirmNewGame { .. } => "confirmNewGame",
            ContractCall::ProposeMove { .. } => "proposeMove",
            ContractCall::AuthorizeMove { .. } => "authorizeMove",
            ContractCall::ProposeDraw => "proposeDraw",
            ContractCall::AuthorizeDraw { .. } => "authorizeDraw",
            ContractCall::ProposeWinner => "proposeWinner",
            ContractCall::AuthorizeWinner { .. } => "authorizeWinner",
        }
    }

    /// Call parameters.
    pub fn params(&self) -> Vec<Value> {
        match self {
            ContractCall::ProposeMove { x, y } => vec![json!(x), json!(y)],
            ContractCall::AuthorizeMove { approve }
            | ContractCall::AuthorizeDraw { approve }
            | ContractCall::AuthorizeWinner { approve } => vec![json!(approve)],
            ContractCall::ConfirmNewGame { .. }
            | ContractCall::ProposeDraw
            | ContractCall::ProposeWinner => Vec::new(),
        }
    }

    /// Gas limit for this call.
    pub fn gas_limit(&self, gas: &GasLimits) -> u64 {
        match self {
            ContractCall::ConfirmNewGame { .. } => *gas.confirm(),
            ContractCall::ProposeMove { .. }
            | ContractCall::ProposeDraw
            | ContractCall::ProposeWinner => *gas.propose(),
            ContractCall::AuthorizeMove { .. }
            | ContractCall::AuthorizeDraw { .. }
            | ContractCall::AuthorizeWinner { .. } => *gas.authorize(),
        }
    }

    /// Value sent with the call, if any.
    pub fn value(&self) -> Option<Wei> {
        match self {
            ContractCall::ConfirmNewGame { wager } => Some(*wager),
            _ => None,
        }
    }
}

fn first<'a>(field: &str, results: &'a [Value]) -> Result<&'a Value, GameError> {
    results
        .first()
        .ok_or_else(|| GameError::decode(field, "empty result list"))
}

fn uint_value(field: &str, value: &Value) -> Result<u64, GameError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| GameError::decode(field, format!("{} is not an unsigned integer", n))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| GameError::decode(field, format!("{:?}: {}", s, e))),
        other => Err(GameError::decode(field, format!("expected integer, got {}", other))),
    }
}

fn coordinate(field: &str, value: &Value) -> Result<usize, GameError> {
    usize::try_from(uint_value(field, value)?).map_err(|e| GameError::decode(field, e.to_string()))
}

/// Decodes a boolean field.
pub fn decode_bool(field: &str, results: &[Value]) -> Result<bool, GameError> {
    match first(field, results)? {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        other => Err(GameError::decode(field, format!("expected boolean, got {}", other))),
    }
}

/// Decodes an unsigned integer field. The ledger sends these either as
/// JSON numbers or as decimal strings.
pub fn decode_uint(field: &str, results: &[Value]) -> Result<u64, GameError> {
    uint_value(field, first(field, results)?)
}

/// Decodes the `winner` field.
pub fn decode_winner(field: &str, results: &[Value]) -> Result<Winner, GameError> {
    let code = decode_uint(field, results)?;
    Winner::from_code(code).ok_or_else(|| GameError::decode(field, format!("unknown winner code {}", code)))
}

/// Decodes an `(x, y, color)` triple.
pub fn decode_placement(field: &str, results: &[Value]) -> Result<Placement, GameError> {
    let [x, y, color] = results else {
        return Err(GameError::decode(
            field,
            format!("expected (x, y, color), got {} values", results.len()),
        ));
    };
    let x = coordinate(field, x)?;
    let y = coordinate(field, y)?;
    let code = uint_value(field, color)?;
    let color = Color::from_code(code)
        .ok_or_else(|| GameError::decode(field, format!("unknown color code {}", code)))?;
    Ok(Placement::new(x, y, color))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_queries_name_contract_getters() {
        assert_eq!(FieldQuery::NumMoves.method(), "getNumMoves");
        assert_eq!(FieldQuery::Move { index: 4 }.method(), "getMove");
        assert_eq!(FieldQuery::Move { index: 4 }.params(), vec![json!(4)]);
        assert!(FieldQuery::BlackTurn.params().is_empty());
        assert_eq!(FieldQuery::Move { index: 4 }.to_string(), "getMove(4)");
    }

    #[test]
    fn test_calls_carry_params_gas_and_value() {
        let gas = GasLimits::default();
        let mv = ContractCall::ProposeMove { x: 3, y: 9 };
        assert_eq!(mv.method(), "proposeMove");
        assert_eq!(mv.params(), vec![json!(3), json!(9)]);
        assert_eq!(mv.gas_limit(&gas), 100_000);
        assert_eq!(mv.value(), None);

        let auth = ContractCall::AuthorizeWinner { approve: false };
        assert_eq!(auth.params(), vec![json!(false)]);
        assert_eq!(auth.gas_limit(&gas), 200_000);

        let confirm = ContractCall::ConfirmNewGame { wager: Wei(5) };
        assert_eq!(confirm.value(), Some(Wei(5)));
        assert!(confirm.params().is_empty());
    }

    #[test]
    fn test_decode_uint_accepts_numbers_and_strings() {
        assert_eq!(decode_uint("size", &[json!(13)]).unwrap(), 13);
        assert_eq!(decode_uint("size", &[json!("19")]).unwrap(), 19);
        assert!(decode_uint("size", &[json!(-1)]).is_err());
        assert!(decode_uint("size", &[json!("nineteen")]).is_err());
        assert!(decode_uint("size", &[]).is_err());
    }

    #[test]
    fn test_decode_bool() {
        assert!(decode_bool("draw", &[json!(true)]).unwrap());
        assert!(!decode_bool("draw", &[json!("false")]).unwrap());
        assert!(matches!(
            decode_bool("draw", &[json!(1)]),
            Err(GameError::Decode { .. })
        ));
    }

    #[test]
    fn test_decode_winner_rejects_unknown_codes() {
        assert_eq!(decode_winner("winner", &[json!(1)]).unwrap(), Winner::Black);
        assert!(decode_winner("winner", &[json!(3)]).is_err());
    }

    #[test]
    fn test_decode_placement() {
        let placement = decode_placement("getMove(0)", &[json!(2), json!("5"), json!(2)]).unwrap();
        assert_eq!(placement, Placement::new(2, 5, Color::White));

        assert!(decode_placement("getMove(0)", &[json!(2), json!(5), json!(0)]).is_err());
        assert!(decode_placement("getMove(0)", &[json!(2), json!(5)]).is_err());
    }

    #[test]
    fn test_decode_placement_never_truncates_coordinates() {
        let wide = decode_placement("getMove(0)", &[json!(u64::MAX), json!(0), json!(1)]);
        match usize::try_from(u64::MAX) {
            Ok(x) => assert_eq!(wide.unwrap().x, x),
            Err(_) => assert!(matches!(wide, Err(GameError::Decode { .. }))),
        }
    }
}
