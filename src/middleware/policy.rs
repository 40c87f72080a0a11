//! Authorization policy.
//!
//! A pure decision function: given who is acting and what they want to do,
//! return a `Grant` or a `Denial`. No I/O happens here; handlers resolve
//! tokens, verify passwords and read ownership projections first, then ask.
//!
//! Privilege comparisons go through `TokenType::at_least`, which keeps the
//! "lower code is more powerful" ordering in one place.

use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::models::todo::Ownership;
use crate::models::token::{Resolution, Token, TokenType};

/// The party behind a request, after credentials were checked.
#[derive(Debug, Clone)]
pub enum Actor {
    /// No credential presented.
    Anonymous,
    /// A verified username/password pair.
    User { user_id: i64 },
    /// A presented bearer value and what it resolved to.
    Bearer(Resolution),
}

impl Actor {
    fn token(&self) -> Option<&Token> {
        match self {
            Actor::Bearer(res) => res.token(),
            _ => None,
        }
    }

    /// The resolved token if it grants at least `floor`.
    fn token_at_least(&self, floor: TokenType) -> Option<&Token> {
        self.token().filter(|t| t.token_type.at_least(floor))
    }
}

/// What the actor is asking to do.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    CreateTodo,
    /// Todo operations carry the ownership projection, `None` when no row
    /// exists. Privilege is checked before existence.
    UpdateTodo(Option<&'a Ownership>),
    DeleteTodo(Option<&'a Ownership>),
    ReadTodo(Option<&'a Ownership>),
    ListTodos,
    /// `requested` is the raw wire code; it may be out of range.
    MintToken { requested: i64 },
    InvalidateToken { target: &'a Token },
    ListTags,
}

/// A positive decision, carrying whatever the caller needs to act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Allowed,
    /// Create a todo owned by `owner_id`.
    CreateAs { owner_id: i64 },
    /// Mint a token of `token_type` owned by `owner_id`.
    Mint { owner_id: i64, token_type: TokenType },
    /// List public todos plus the private ones of `owner_id`, if any.
    ListVisible { owner_id: Option<i64> },
}

/// Operations that have a privilege floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privileged {
    CreateTodo,
    ModifyTodo,
    RemoveTodo,
    MintToken,
    RevokeToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Todo,
    Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Insufficient authorization provided")]
    MissingCredentials,

    #[error("Invalid username and password combination")]
    InvalidCredentials,

    #[error("Invalid requested token type")]
    InvalidTokenType,

    #[error("{}", .0.reason())]
    InsufficientPrivilege(Privileged),

    #[error("Master tokens may only be invalidated by themselves or by their owner's password")]
    SelfInvalidationRequired,

    #[error("{}", .0.not_owned_reason())]
    OwnershipMismatch(Resource),

    #[error("{}", .0.not_found_reason())]
    NotFound(Resource),
}

impl Privileged {
    fn reason(self) -> &'static str {
        match self {
            Privileged::CreateTodo => "Authorization token lacks creation privilege",
            Privileged::ModifyTodo => "Authorization token lacks modification privilege",
            Privileged::RemoveTodo => "Authorization token lacks removal privilege",
            Privileged::MintToken => "Authorization token lacks token creation privilege",
            Privileged::RevokeToken => "Authorization token lacks token removal privilege",
        }
    }
}

impl Resource {
    fn not_owned_reason(self) -> &'static str {
        match self {
            Resource::Todo => "User does not own todo",
            Resource::Token => "User does not own token",
        }
    }

    fn not_found_reason(self) -> &'static str {
        match self {
            Resource::Todo => "Todo not found in database",
            Resource::Token => "Invalid field token",
        }
    }
}

impl Denial {
    /// Stable machine-checkable code.
    pub fn code(&self) -> &'static str {
        match self {
            Denial::MissingCredentials => "missing_credentials",
            Denial::InvalidCredentials => "invalid_credentials",
            Denial::InvalidTokenType => "invalid_token_type",
            Denial::InsufficientPrivilege(op) => match op {
                Privileged::CreateTodo => "create_privilege_required",
                Privileged::ModifyTodo => "modify_privilege_required",
                Privileged::RemoveTodo => "remove_privilege_required",
                Privileged::MintToken => "mint_privilege_required",
                Privileged::RevokeToken => "revoke_privilege_required",
            },
            Denial::SelfInvalidationRequired => "self_invalidation_required",
            Denial::OwnershipMismatch(Resource::Todo) => "todo_not_owned",
            Denial::OwnershipMismatch(Resource::Token) => "token_not_owned",
            Denial::NotFound(Resource::Todo) => "todo_not_found",
            Denial::NotFound(Resource::Token) => "token_not_found",
        }
    }
}

/// Decide whether `actor` may perform `op`.
pub fn authorize(actor: &Actor, op: Operation<'_>) -> Result<Grant, Denial> {
    match op {
        Operation::CreateTodo => {
            let token = actor
                .token_at_least(TokenType::Create)
                .ok_or(Denial::InsufficientPrivilege(Privileged::CreateTodo))?;
            Ok(Grant::CreateAs {
                owner_id: token.owner_id,
            })
        }

        Operation::UpdateTodo(todo) => {
            let token = actor
                .token_at_least(TokenType::Edit)
                .ok_or(Denial::InsufficientPrivilege(Privileged::ModifyTodo))?;
            let todo = todo.ok_or(Denial::NotFound(Resource::Todo))?;
            require_owner(token.owner_id, todo.owner_id, Resource::Todo)?;
            Ok(Grant::Allowed)
        }

        Operation::DeleteTodo(todo) => {
            let token = actor
                .token_at_least(TokenType::Master)
                .ok_or(Denial::InsufficientPrivilege(Privileged::RemoveTodo))?;
            let todo = todo.ok_or(Denial::NotFound(Resource::Todo))?;
            require_owner(token.owner_id, todo.owner_id, Resource::Todo)?;
            Ok(Grant::Allowed)
        }

        Operation::ReadTodo(todo) => {
            let todo = todo.ok_or(Denial::NotFound(Resource::Todo))?;
            if todo.public {
                return Ok(Grant::Allowed);
            }
            // Private: any failure looks exactly like a missing row.
            match actor.token_at_least(TokenType::Edit) {
                Some(token) if token.owner_id == todo.owner_id => Ok(Grant::Allowed),
                _ => Err(Denial::NotFound(Resource::Todo)),
            }
        }

        Operation::ListTodos => Ok(Grant::ListVisible {
            owner_id: actor
                .token_at_least(TokenType::Master)
                .map(|t| t.owner_id),
        }),

        Operation::MintToken { requested } => match actor {
            Actor::Anonymous => Err(Denial::MissingCredentials),
            Actor::User { user_id } => {
                let token_type =
                    TokenType::from_code(requested).ok_or(Denial::InvalidTokenType)?;
                Ok(Grant::Mint {
                    owner_id: *user_id,
                    token_type,
                })
            }
            Actor::Bearer(_) => {
                let authority = actor
                    .token_at_least(TokenType::Master)
                    .ok_or(Denial::InsufficientPrivilege(Privileged::MintToken))?;
                // Delegation may not produce another master.
                let token_type = match TokenType::from_code(requested) {
                    Some(t @ (TokenType::Edit | TokenType::Create)) => t,
                    _ => return Err(Denial::InvalidTokenType),
                };
                Ok(Grant::Mint {
                    owner_id: authority.owner_id,
                    token_type,
                })
            }
        },

        Operation::InvalidateToken { target } => match actor {
            Actor::Anonymous => Err(Denial::MissingCredentials),
            Actor::User { user_id } => {
                require_owner(*user_id, target.owner_id, Resource::Token)?;
                Ok(Grant::Allowed)
            }
            Actor::Bearer(res) if target.token_type == TokenType::Master => {
                match res.token() {
                    Some(presented) if same_value(presented, target) => Ok(Grant::Allowed),
                    _ => Err(Denial::SelfInvalidationRequired),
                }
            }
            Actor::Bearer(_) => {
                let authority = actor
                    .token_at_least(TokenType::Master)
                    .ok_or(Denial::InsufficientPrivilege(Privileged::RevokeToken))?;
                require_owner(authority.owner_id, target.owner_id, Resource::Token)?;
                Ok(Grant::Allowed)
            }
        },

        Operation::ListTags => Ok(Grant::Allowed),
    }
}

fn require_owner(actor_owner: i64, resource_owner: i64, resource: Resource) -> Result<(), Denial> {
    if actor_owner == resource_owner {
        Ok(())
    } else {
        Err(Denial::OwnershipMismatch(resource))
    }
}

fn same_value(a: &Token, b: &Token) -> bool {
    a.value.as_bytes().ct_eq(b.value.as_bytes()).into()
}

// ── Tests ───────────────────────────────────────────────────────
