use std::fmt::Display;
use std::path::Path;

use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::export::{ExportSettings, load_settings};
use crate::runtime::ProjectSession;
use crate::viewer::{ShapeLayer, ShapeStore};

use super::types::{Cli, Commands, FileInfo, ProjectInfo};

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let root = cli.project.as_path();

    match cli.command {
        Commands::Create { copy_files } => {
            let session = ProjectSession::create(root, copy_files).map_err(fail)?;
            print_json(&json!({
                "status": "ok",
                "project": session.project().root(),
                "local_project": copy_files,
            }))?;
        }
        Commands::Info => {
            let session = ProjectSession::load(root).map_err(fail)?;
            let project = session.project();
            let info = ProjectInfo {
                root: project.root().display().to_string(),
                local_project: project.local_project(),
                ndim: project.ndim(),
                files: project
                    .files()
                    .iter()
                    .map(|file| FileInfo {
                        path: file.path.clone(),
                        channel: file.channel.clone(),
                        rois: file.index.len(),
                        stacks: file.index.stack_to_rois().clone(),
                        last_stack_id: file.index.last_stack_id(),
                    })
                    .collect(),
            };
            print_json(&info)?;
        }
        Commands::AddFile { inputs } => {
            let mut session = ProjectSession::load(root).map_err(fail)?;
            let mut added = Vec::new();
            for input in &inputs {
                if let Some(key) = session.add_file(input).map_err(fail)? {
                    added.push(key);
                }
            }
            print_json(&json!({"status": "ok", "added": added}))?;
        }
        Commands::RemoveFile { file } => {
            let mut session = ProjectSession::load(root).map_err(fail)?;
            let mut layer = ShapeStore::new();
            let removed = session.remove_file(&file, &mut layer).map_err(fail)?;
            print_json(&json!({
                "status": "ok",
                "removed": removed.path,
                "rois": removed.index.len(),
            }))?;
        }
        Commands::Channel { file, channel } => {
            let mut session = ProjectSession::load(root).map_err(fail)?;
            session.select_channel(&file, &channel).map_err(fail)?;
            print_json(&json!({"status": "ok", "file": file, "channel": channel}))?;
        }
        Commands::AddStack {
            file,
            step,
            width,
            size,
        } => {
            let (mut session, mut layer) = open(root, &file)?;
            let stack = session
                .add_fixed_stack(&mut layer, &step, width, size)
                .map_err(fail)?;
            print_json(&json!({"status": "ok", "stack": stack, "rois": layer.len()}))?;
        }
        Commands::AddRoi { file, step, size } => {
            let (mut session, mut layer) = open(root, &file)?;
            session
                .add_fixed_stack(&mut layer, &step, 1, size)
                .map_err(fail)?;
            print_json(&json!({"status": "ok", "roi": layer.len() - 1}))?;
        }
        Commands::MoveRoi {
            file,
            index,
            rows,
            cols,
        } => {
            let (mut session, mut layer) = open(root, &file)?;
            if !layer.move_shape(index, rows, cols).map_err(fail)? {
                return Err(format!("`{file}` has no ROI {index}"));
            }
            layer.round_all();
            let change = session.shapes_changed(&mut layer).map_err(fail)?;
            print_json(&change)?;
        }
        Commands::DeleteRoi { file, indices } => {
            let (mut session, mut layer) = open(root, &file)?;
            if let Some(index) = indices.iter().find(|index| **index >= layer.len()) {
                return Err(format!("`{file}` has no ROI {index}"));
            }
            layer.remove_shapes(&indices);
            let change = session.shapes_changed(&mut layer).map_err(fail)?;
            print_json(&change)?;
        }
        Commands::Paint { file, roi, label } => {
            let (mut session, _layer) = open(root, &file)?;
            session.paint_roi(roi, label).map_err(fail)?;
            session.save_annotations().map_err(fail)?;
            print_json(&json!({"status": "ok", "roi": roi, "label": label}))?;
        }
        Commands::SaveAnnotations { file, rois_csv } => {
            let (session, _layer) = open(root, &file)?;
            session.save_annotations().map_err(fail)?;
            let table = if rois_csv {
                session.rois_csv().map_err(fail)?
            } else {
                None
            };
            print_json(&json!({
                "status": "ok",
                "annotations": session.project().annotation_path(&file),
                "rois_csv": table,
            }))?;
        }
        Commands::Export {
            folder,
            settings,
            source_folder,
            source_prefix,
            target_folder,
            target_prefix,
            drop_filename,
        } => {
            let mut export_settings = match settings {
                Some(path) => load_settings(&path).map_err(fail)?,
                None => ExportSettings::default(),
            };
            if let Some(value) = source_folder {
                export_settings.source_folder = value;
            }
            if let Some(value) = source_prefix {
                export_settings.source_prefix = value;
            }
            if let Some(value) = target_folder {
                export_settings.target_folder = value;
            }
            if let Some(value) = target_prefix {
                export_settings.target_prefix = value;
            }
            if drop_filename {
                export_settings.keep_original_filename = false;
            }

            let session = ProjectSession::load(root).map_err(fail)?;
            let report = session.export(&folder, &export_settings).map_err(fail)?;
            print_json(&report)?;
        }
    }

    Ok(())
}

/// `-v` turns on debug output; otherwise `RUST_LOG` applies, defaulting to warnings.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open(root: &Path, file: &str) -> Result<(ProjectSession, ShapeStore), String> {
    let mut session = ProjectSession::load(root).map_err(fail)?;
    let mut layer = ShapeStore::new();
    session.open_file(file, &mut layer).map_err(fail)?;
    Ok((session, layer))
}

fn fail(error: impl Display) -> String {
    error.to_string()
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    println!("{}", serde_json::to_string_pretty(value).map_err(fail)?);
    Ok(())
}
