use std::fmt;

use sqlx::FromRow;

/// Wire code reported for a token that did not resolve.
/// Outside the range of every real privilege level.
pub const INVALID_TYPE_CODE: i16 = 9;

/// Privilege level bound to a token at mint time.
///
/// Ordering is by *restriction*: a lower code is more powerful. `Master` (1)
/// can mint tokens and delete todos, `Edit` (2) can read and write todos,
/// `Create` (3) can only create todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Master,
    Edit,
    Create,
}

impl TokenType {
    pub fn code(self) -> i16 {
        match self {
            TokenType::Master => 1,
            TokenType::Edit => 2,
            TokenType::Create => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(TokenType::Master),
            2 => Some(TokenType::Edit),
            3 => Some(TokenType::Create),
            _ => None,
        }
    }

    /// `true` when `self` grants at least the privileges of `floor`.
    /// Compares codes with `<=`; the direction matters.
    pub fn at_least(self, floor: TokenType) -> bool {
        self.code() <= floor.code()
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenType::Master => "master",
            TokenType::Edit => "edit",
            TokenType::Create => "create",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "master" | "1" => Ok(TokenType::Master),
            "edit" | "2" => Ok(TokenType::Edit),
            "create" | "3" => Ok(TokenType::Create),
            other => Err(format!("unknown token type: {}", other)),
        }
    }
}

/// A live bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub id: i64,
    pub token_type: TokenType,
    pub value: String,
    pub owner_id: i64,
}

// Keep the bearer value out of logs and panic messages.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("token_type", &self.token_type)
            .field("value", &"<redacted>")
            .field("owner_id", &self.owner_id)
            .finish()
    }
}

/// Insert payload for the `tokens` table. Carries no id: the store assigns one.
#[derive(Debug, Clone)]
pub struct NewToken {
    pub token_type: TokenType,
    pub value: String,
    pub owner_id: i64,
}

/// Raw `tokens` row as stored; `token_type` is the numeric code.
#[derive(Debug, Clone, FromRow)]
pub struct TokenRow {
    pub id: i64,
    #[sqlx(rename = "type")]
    pub token_type: i16,
    pub value: String,
    pub owner_id: i64,
}

impl TryFrom<TokenRow> for Token {
    type Error = i16;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        let token_type = TokenType::from_code(row.token_type as i64).ok_or(row.token_type)?;
        Ok(Token {
            id: row.id,
            token_type,
            value: row.value,
            owner_id: row.owner_id,
        })
    }
}

/// Outcome of presenting a bearer value.
///
/// `Invalid` is an expected result, not an error: callers branch on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Token),
    Invalid,
}

impl Resolution {
    pub fn token(&self) -> Option<&Token> {
        match self {
            Resolution::Resolved(t) => Some(t),
            Resolution::Invalid => None,
        }
    }

    /// Numeric type as reported on the wire; `INVALID_TYPE_CODE` when unresolved.
    pub fn type_code(&self) -> i16 {
        self.token()
            .map(|t| t.token_type.code())
            .unwrap_or(INVALID_TYPE_CODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_ordering_is_by_restriction() {
        assert!(TokenType::Master.at_least(TokenType::Master));
        assert!(TokenType::Master.at_least(TokenType::Edit));
        assert!(TokenType::Master.at_least(TokenType::Create));
        assert!(TokenType::Edit.at_least(TokenType::Create));
        assert!(!TokenType::Edit.at_least(TokenType::Master));
        assert!(!TokenType::Create.at_least(TokenType::Edit));
    }

    #[test]
    fn test_from_code_rejects_out_of_range() {
        assert_eq!(TokenType::from_code(1), Some(TokenType::Master));
        assert_eq!(TokenType::from_code(3), Some(TokenType::Create));
        assert_eq!(TokenType::from_code(0), None);
        assert_eq!(TokenType::from_code(4), None);
        assert_eq!(TokenType::from_code(INVALID_TYPE_CODE as i64), None);
        assert_eq!(TokenType::from_code(-1), None);
    }

    #[test]
    fn test_parse_from_cli_names() {
        assert_eq!("MASTER".parse::<TokenType>(), Ok(TokenType::Master));
        assert_eq!("edit".parse::<TokenType>(), Ok(TokenType::Edit));
        assert_eq!("3".parse::<TokenType>(), Ok(TokenType::Create));
        assert!("admin".parse::<TokenType>().is_err());
    }

    #[test]
    fn test_invalid_resolution_reports_sentinel_code() {
        assert_eq!(Resolution::Invalid.type_code(), INVALID_TYPE_CODE);
        let edit = Resolution::Resolved(Token {
            id: 1,
            token_type: TokenType::Edit,
            value: "x".into(),
            owner_id: 7,
        });
        assert_eq!(edit.type_code(), 2);
    }

    #[test]
    fn test_debug_redacts_value() {
        let t = Token {
            id: 4,
            token_type: TokenType::Master,
            value: "SuperSecretBearerValue".into(),
            owner_id: 1,
        };
        let dbg = format!("{:?}", t);
        assert!(!dbg.contains("SuperSecret"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn test_row_with_unknown_code_does_not_convert() {
        let row = TokenRow {
            id: 1,
            token_type: 7,
            value: "v".into(),
            owner_id: 1,
        };
        assert_eq!(Token::try_from(row).unwrap_err(), 7);
    }
}
