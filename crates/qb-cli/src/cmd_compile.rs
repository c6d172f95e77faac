use std::path::Path;

use anyhow::Result;

use qb_config::{EmitFormat, QbConfig};

pub fn run(file: &Path, json: bool, config: &QbConfig) -> Result<()> {
    let output = crate::compile_file(file)?;

    let emit = if json {
        EmitFormat::Json
    } else {
        config.compile.emit
    };
    match emit {
        EmitFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        EmitFormat::Text => println!("{output}"),
    }
    Ok(())
}
