use clap::{Parser, Subcommand};

use todo_gateway::models::token::TokenType;

/// Todo gateway: todo lists guarded by capability tokens
#[derive(Parser)]
#[command(name = "todo-gateway", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind (defaults to TODO_PORT / PORT / 8080)
        #[arg(short, long)]
        port: Option<u16>,
        /// Keep everything in process memory instead of Postgres
        #[arg(long)]
        in_memory: bool,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage capability tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user account
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, env = "TODO_USER_PASSWORD")]
        password: String,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Mint a token for a user, authenticating with their password
    Mint {
        #[arg(long)]
        username: String,
        #[arg(long, env = "TODO_USER_PASSWORD")]
        password: String,
        /// master, edit, create (or 1, 2, 3)
        #[arg(long = "type", default_value = "create")]
        token_type: TokenType,
    },
    /// Delete a token by its numeric id
    Revoke {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// Create a tag
    Add {
        #[arg(long)]
        name: String,
    },
}
