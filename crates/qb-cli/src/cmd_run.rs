use std::path::Path;

use anyhow::Result;

use qb_config::{QbConfig, VarSource};
use qb_core::{RuntimeValue, VarTable, materialize};

pub fn run(file: &Path, config: &QbConfig) -> Result<()> {
    let output = crate::compile_file(file)?;
    let env = var_table(config);
    let ir = materialize(&output, &env).map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("{ir}");
    Ok(())
}

fn var_table(config: &QbConfig) -> VarTable {
    config
        .vars
        .iter()
        .map(|var| {
            let value = match &var.source {
                VarSource::Entity(name) => RuntimeValue::Entity(name.clone()),
                VarSource::Table(name) => RuntimeValue::Table(name.clone()),
            };
            (var.name.clone(), value)
        })
        .collect()
}
