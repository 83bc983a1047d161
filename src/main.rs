//! Address book writer
//!
//! Loads the address book stored in the file named on the command line (or
//! starts a new one), prompts for one more person on stdin, and writes the
//! book back. Set `RUST_LOG=debug` to see the loaded book and what the
//! library does with it.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use lazy_static::lazy_static;
use protium::store::{self, FileStore};
use protium::tutorial::{
    self, BOOK, BOOK_PEOPLE, HOME, MOBILE, PERSON_EMAIL, PERSON_ID, PERSON_NAME, PERSON_PHONES,
    PHONE_KIND, PHONE_NUMBER, WORK,
};
use protium::{DecodeOptions, Record, Registry, SchemaError, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

lazy_static! {
    static ref TUTORIAL: Result<Arc<Registry>, SchemaError> = tutorial::registry();
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> io::Result<String> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// Fills in `person` from the answers read on `input`
fn prompt_for_address<R: BufRead, W: Write>(
    person: &mut Record,
    input: &mut R,
    out: &mut W,
) -> protium::Result<()> {
    let id = ask(input, out, "Enter person ID number: ")?;
    let id: i32 = id.trim().parse().map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("`{id}` is not an ID number"))
    })?;
    person.set(PERSON_ID, Value::Int32(id))?;

    let name = ask(input, out, "Enter name: ")?;
    person.set(PERSON_NAME, Value::String(name))?;

    let email = ask(input, out, "Enter email address (blank for none): ")?;
    if !email.is_empty() {
        person.set(PERSON_EMAIL, Value::String(email))?;
    }

    loop {
        let number = ask(input, out, "Enter a phone number (or leave blank to finish): ")?;
        if number.is_empty() {
            break;
        }
        let phone = person.add_message(PERSON_PHONES)?;
        phone.set(PHONE_NUMBER, Value::String(number))?;

        let kind = ask(input, out, "Is this a mobile, home, or work phone? ")?;
        let number = match kind.as_str() {
            "mobile" => Some(MOBILE),
            "home" => Some(HOME),
            "work" => Some(WORK),
            _ => None,
        };
        match number {
            Some(number) => phone.set(PHONE_KIND, Value::Enum(number))?,
            None => writeln!(out, "Unknown phone type.  Using default.")?,
        }
    }
    Ok(())
}

/// Loads the book stored in `file`, or starts an empty one if there is none
fn load_book(file: &FileStore, registry: &Arc<Registry>) -> protium::Result<Record> {
    match store::load(file, registry, BOOK, &DecodeOptions::default())? {
        Some(book) => {
            debug!("loaded address book:\n{book}");
            Ok(book)
        }
        None => {
            println!("{}: File not found.  Creating a new file.", file.path().display());
            Ok(Record::new(registry, BOOK)?)
        }
    }
}

fn run(path: &Path) -> protium::Result<()> {
    let registry = TUTORIAL.clone()?;
    let mut file = FileStore::new(path);
    let mut book = load_book(&file, &registry)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    prompt_for_address(book.add_message(BOOK_PEOPLE)?, &mut input, &mut out)?;

    store::save(&book, &mut file)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        let program = args.first().map_or("addressbook", String::as_str);
        eprintln!("Usage:  {program} ADDRESS_BOOK_FILE");
        return ExitCode::FAILURE;
    }

    match run(Path::new(&args[1])) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
