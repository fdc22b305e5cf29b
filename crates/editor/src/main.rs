use std::io::Read;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;

use unbox_editor_lib::command::execute_json_batch;
use unbox_editor_lib::external::{ObjMeshIo, TokioRunner};
use unbox_editor_lib::harness::{EditorHarness, ExternalTools};
use unbox_editor_lib::state::AppSettings;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unbox_editor=info,unbox_editor_lib=info".into()),
        )
        .init();

    let script = match read_script() {
        Ok(script) => script,
        Err(e) => {
            tracing::error!("Failed to read script: {e}");
            return ExitCode::FAILURE;
        }
    };

    let settings = AppSettings::load();
    let tools = match ExternalTools::new(Arc::new(TokioRunner), Rc::new(ObjMeshIo), &settings) {
        Ok(tools) => tools,
        Err(e) => {
            tracing::error!("Failed to start job runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut harness = EditorHarness::with_external(&settings, tools);
    let responses = match execute_json_batch(&mut harness, &script) {
        Ok(responses) => responses,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&responses) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("Failed to encode responses: {e}");
            return ExitCode::FAILURE;
        }
    }

    if responses.iter().all(|r| r.success) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Commands from `--script <path>`, or stdin when no path is given
fn read_script() -> std::io::Result<String> {
    let args: Vec<String> = std::env::args().collect();
    if let Some(i) = args.iter().position(|a| a == "--script") {
        if let Some(path) = args.get(i + 1) {
            tracing::info!("Running script {path}");
            return std::fs::read_to_string(path);
        }
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "--script needs a path",
        ));
    }
    let mut script = String::new();
    std::io::stdin().read_to_string(&mut script)?;
    Ok(script)
}
