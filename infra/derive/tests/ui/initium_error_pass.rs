use initium_derive::initium_error;
use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
#[error("upstream refused")]
pub struct Refused;

#[initium_error]
pub enum Error {
    #[error("Upstream call failed{}: {source}", format_context(.context))]
    Upstream { source: Refused, context: Option<Cow<'static, str>> },

    #[error("Bad input: {reason}")]
    BadInput { reason: String },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn call() -> Result<(), Refused> {
    Err(Refused)
}

fn run() -> Result<(), Error> {
    call().context("calling upstream")?;
    Err("boom".into())
}

fn main() {
    let _ = run();
    let _ = Error::BadInput { reason: "empty".to_owned() };
}
