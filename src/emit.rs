//! The emission entry point: opens the output file (or writes to any
//! `Write`) and drives the fixed six-stage encoder order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::context::EmissionContext;
use crate::db::Database;
use crate::design::Design;
use crate::error::{EmitError, Result};
use crate::{bram, clocking, config_center, dsp, invertible_pins, io, logic, pseudopip, routing};

/// Options threaded through a single emission run. Currently only controls
/// whether unprocessed route-thru PIPs are logged; kept as a struct rather
/// than a bare bool so future per-run knobs don't need a signature change.
#[derive(Clone, Copy, Debug)]
pub struct EmitOptions {
    pub warn_on_routethru: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions { warn_on_routethru: true }
    }
}

/// Opens `path` and emits into it. A failure to create the file maps to
/// `EmitError::OpenOutput`, per spec.md §7's "Fatal: cannot open output".
pub fn emit_to_file(db: &dyn Database, design: &dyn Design, path: impl AsRef<Path>, opts: EmitOptions) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| EmitError::OpenOutput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    emit(db, design, &mut writer, opts)?;
    writer.flush()?;
    Ok(())
}

/// Drives the fixed encoder order against any `Write` sink: logic → config
/// → io → routing → bram → clocking → ip (DSP48E1). The pseudo-PIP table
/// and invertible-pins table are each built once, up front, and shared by
/// every encoder that needs them.
pub fn emit(db: &dyn Database, design: &dyn Design, out: &mut dyn Write, opts: EmitOptions) -> Result<()> {
    let mut ctx = EmissionContext::new(out);
    let table = pseudopip::build_table();
    let invertible = invertible_pins::build();

    for (tile, _type_name) in db.tiles_and_types() {
        logic::emit_tile(db, design, &mut ctx, *tile)?;
    }
    ctx.blank()?;

    config_center::emit(db, design, &mut ctx)?;
    ctx.blank()?;

    io::emit(db, design, &mut ctx, &invertible)?;
    ctx.blank()?;

    let pips_by_tile = routing::emit_routing(db, design, &mut ctx, &table, &opts)?;
    ctx.blank()?;

    bram::emit(db, design, &mut ctx, &pips_by_tile, &invertible)?;
    ctx.blank()?;

    clocking::emit(db, design, &mut ctx, &pips_by_tile)?;
    ctx.blank()?;

    dsp::emit(db, design, &mut ctx, &invertible)?;

    debug_assert_eq!(ctx.prefix_depth(), 0, "prefix stack must return to empty between top-level sections");

    Ok(())
}
