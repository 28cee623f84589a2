//! Wire types: one JSON object per line in each direction.

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};
use crate::stores::Account;

/// One request line on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    CreateAccount { name: String, amount: i64 },
    DeleteAccount { name: String },
    ChangeAccountName { name: String, new_name: String },
    ChangeAccountAmount { name: String, new_amount: i64 },
    GetAccount { name: String },
}

/// One response line on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { result: String },
    Account { name: String, amount: i64 },
    Error { kind: ErrorKind, message: String },
}

impl Response {
    pub fn done(result: &str) -> Self {
        Response::Ok {
            result: result.to_owned(),
        }
    }
}

impl From<Account> for Response {
    fn from(account: Account) -> Self {
        Response::Account {
            name: account.name,
            amount: account.amount,
        }
    }
}

impl From<Error> for Response {
    fn from(err: Error) -> Self {
        Response::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
