//! Command-line client for the note RPC API.
//!
//! ```text
//! notectl [list|get|create|update|delete] [--id N] [--title T] [--content C]
//! ```
//!
//! The server address comes from `NOTECTL_ADDR`.

use std::process::ExitCode;

use noted::{
    dto::{ListNotesResponse, NoteResponse},
    handlers::grpc::proto::{
        CreateNoteRequest, DeleteNoteRequest, GetNoteRequest, Note, UpdateNoteRequest,
        note_service_client::NoteServiceClient,
    },
};
use serde_json::to_string_pretty;
use tonic::transport::Channel;

#[derive(Debug, Default)]
struct Args {
    op: String,
    id: i64,
    title: String,
    content: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args {
        op: "list".to_string(),
        ..Args::default()
    };

    while let Some(arg) = args.next() {
        let mut value =
            |flag: &str| args.next().ok_or_else(|| format!("missing value for {flag}"));
        match arg.as_str() {
            "--id" => {
                parsed.id = value("--id")?
                    .parse()
                    .map_err(|e| format!("invalid --id: {e}"))?;
            }
            "--title" => parsed.title = value("--title")?,
            "--content" => parsed.content = value("--content")?,
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            op => op.clone_into(&mut parsed.op),
        }
    }

    Ok(parsed)
}

/// Masks only the fields the user actually passed.
fn update_request(args: &Args) -> UpdateNoteRequest {
    let mut paths = Vec::new();
    if !args.title.is_empty() {
        paths.push("title".to_string());
    }
    if !args.content.is_empty() {
        paths.push("content".to_string());
    }

    UpdateNoteRequest {
        note: Some(Note {
            id: args.id,
            title: args.title.clone(),
            content: args.content.clone(),
            ..Note::default()
        }),
        update_mask: Some(prost_types::FieldMask { paths }),
    }
}

async fn call(
    client: &mut NoteServiceClient<Channel>,
    args: &Args,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match args.op.as_str() {
        "list" => {
            let notes = client.list_notes(()).await?.into_inner().notes;
            to_string_pretty(&ListNotesResponse {
                notes: notes.into_iter().map(NoteResponse::from).collect(),
            })?
        }
        "get" => {
            let note = client
                .get_note(GetNoteRequest { note_id: args.id })
                .await?
                .into_inner();
            to_string_pretty(&NoteResponse::from(note))?
        }
        "create" => {
            let request = CreateNoteRequest {
                note: Some(Note {
                    title: args.title.clone(),
                    content: args.content.clone(),
                    ..Note::default()
                }),
            };
            let note = client.create_note(request).await?.into_inner();
            to_string_pretty(&NoteResponse::from(note))?
        }
        "update" => {
            let note = client.update_note(update_request(args)).await?.into_inner();
            to_string_pretty(&NoteResponse::from(note))?
        }
        "delete" => {
            client
                .delete_note(DeleteNoteRequest { note_id: args.id })
                .await?;
            "{}".to_string()
        }
        op => return Err(format!("unknown operation {op}").into()),
    };

    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let addr =
        std::env::var("NOTECTL_ADDR").unwrap_or_else(|_| "http://127.0.0.1:50051".to_string());

    let mut client = match NoteServiceClient::connect(addr.clone()).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("failed to connect to {addr}: {e}");
            return ExitCode::FAILURE;
        }
    };

    match call(&mut client, &args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
