//! Script session — the line-oriented text command interface.
//!
//! One [`Layer`] stack per session. Commands that fail report their error to
//! the output writer and abort only themselves; the session keeps running
//! until `exit` or end of input. The writer is generic so tests can capture
//! everything the session says.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::io;
use crate::layer::Layer;
use crate::ops::Modifier;
use crate::raster::Image;

pub struct Session<W: Write> {
    layer: Layer,
    out: W,
    running: bool,
}

impl<W: Write> Session<W> {
    pub fn new(out: W) -> Self {
        Self {
            layer: Layer::new(),
            out,
            running: true,
        }
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Blocking read-eval loop: one command per line.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        for line in input.lines() {
            self.handle_line(&line?)?;
            if !self.running {
                break;
            }
        }
        Ok(())
    }

    /// Dispatch a single command line. The `Err` return covers failures of
    /// the output stream only; command errors are printed and swallowed.
    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(());
        }

        if parts.len() < 2 {
            if parts[0].eq_ignore_ascii_case("exit") {
                writeln!(self.out, "All unsaved changes will be lost.")?;
                crate::log_info!("session closed by exit command");
                self.running = false;
            } else {
                writeln!(self.out, "Invalid number of arguments.")?;
            }
            return Ok(());
        }

        match parts[0] {
            "load" => self.load(&parts),
            "create" => self.create(&parts),
            "apply" => self.apply(&parts),
            "set" => self.set_current(&parts),
            "toggle" => self.toggle(&parts),
            "save" => self.save(&parts),
            "export" => self.export(&parts),
            _ => {
                writeln!(self.out, "Unable to perform that operation!")?;
                Ok(())
            }
        }
    }

    // -- Commands ---------------------------------------------------------

    fn load(&mut self, parts: &[&str]) -> Result<()> {
        if parts.len() < 3 {
            writeln!(self.out, "Invalid number of arguments.")?;
            return Ok(());
        }
        match parts[1] {
            "image" => {
                match io::read_image(Path::new(parts[2]))
                    .and_then(|img| self.layer.add_layer(img))
                {
                    Ok(()) => {
                        crate::log_info!("loaded image {}", parts[2]);
                    }
                    Err(e) => self.report(e)?,
                }
            }
            "state" => match io::read_state(Path::new(parts[2])) {
                Ok(layer) => {
                    // Loaded state replaces the whole session stack.
                    self.layer = layer;
                    crate::log_info!("loaded state {}", parts[2]);
                }
                Err(e) => self.report(e)?,
            },
            _ => writeln!(self.out, "Unknown asset to load.")?,
        }
        Ok(())
    }

    fn create(&mut self, parts: &[&str]) -> Result<()> {
        if parts.len() < 5 || parts[1] != "checkerboard" {
            writeln!(self.out, "Invalid number of arguments.")?;
            return Ok(());
        }
        let (Ok(w), Ok(h), Ok(cell)) = (
            parts[2].parse::<u32>(),
            parts[3].parse::<u32>(),
            parts[4].parse::<u32>(),
        ) else {
            writeln!(self.out, "Checkerboard requires integer dimensions.")?;
            return Ok(());
        };
        match Image::checkerboard(w, h, 255, cell).and_then(|img| self.layer.add_layer(img)) {
            Ok(()) => {
                crate::log_info!("created {}x{} checkerboard", w, h);
            }
            Err(e) => self.report(e)?,
        }
        Ok(())
    }

    fn apply(&mut self, parts: &[&str]) -> Result<()> {
        let Some(modifier) = self.parse_modifier(parts)? else {
            return Ok(());
        };
        let result = if let Modifier::Downscale { width, height } = modifier {
            self.layer.alter_layer(&modifier, width, height)
        } else {
            self.layer.apply_to_current(&modifier)
        };
        match result {
            Ok(()) => {
                crate::log_info!("applied {}", modifier.name());
            }
            Err(e) => self.report(e)?,
        }
        Ok(())
    }

    fn set_current(&mut self, parts: &[&str]) -> Result<()> {
        let Ok(index) = parts[1].parse::<usize>() else {
            writeln!(self.out, "Must enter an integer.")?;
            return Ok(());
        };
        if let Err(e) = self.layer.set_current(index) {
            self.report(e)?;
        }
        Ok(())
    }

    fn toggle(&mut self, parts: &[&str]) -> Result<()> {
        let Ok(index) = parts[1].parse::<usize>() else {
            writeln!(self.out, "Must enter an integer after toggle.")?;
            return Ok(());
        };
        if let Err(e) = self.layer.toggle_visibility(index) {
            self.report(e)?;
        }
        Ok(())
    }

    fn save(&mut self, parts: &[&str]) -> Result<()> {
        if parts.len() < 3 {
            writeln!(self.out, "Invalid number of arguments.")?;
            return Ok(());
        }
        match parts[1] {
            "image" => {
                if parts.len() < 4 {
                    writeln!(self.out, "Invalid number of arguments.")?;
                    return Ok(());
                }
                let target = if parts[2] == "current" {
                    self.layer.current()
                } else {
                    match parts[2].parse::<usize>() {
                        Ok(index) => self.layer.get_layer(index),
                        Err(_) => {
                            writeln!(self.out, "Layer index must be an integer or 'current'.")?;
                            return Ok(());
                        }
                    }
                };
                match target.and_then(|img| io::write_image(Path::new(parts[3]), img)) {
                    Ok(()) => {
                        crate::log_info!("saved image to {}", parts[3]);
                    }
                    Err(e) => self.report(e)?,
                }
            }
            "state" => match io::write_state(Path::new(parts[2]), &self.layer) {
                Ok(()) => {
                    crate::log_info!("saved state to {}", parts[2]);
                }
                Err(e) => self.report(e)?,
            },
            _ => writeln!(self.out, "Unknown asset to save.")?,
        }
        Ok(())
    }

    fn export(&mut self, parts: &[&str]) -> Result<()> {
        match self
            .layer
            .blend()
            .and_then(|img| io::write_image(Path::new(parts[1]), &img))
        {
            Ok(()) => {
                crate::log_info!("exported blend to {}", parts[1]);
            }
            Err(e) => self.report(e)?,
        }
        Ok(())
    }

    // -- Helpers ----------------------------------------------------------

    /// Build a [`Modifier`] from `apply <name> [args...]`. Returns `None`
    /// (after printing a message) for unknown names or malformed numbers.
    fn parse_modifier(&mut self, parts: &[&str]) -> Result<Option<Modifier>> {
        let modifier = match parts[1] {
            "blur" => Modifier::blur(),
            "sharpen" => Modifier::sharpen(),
            "sepia" => Modifier::sepia(),
            "greyscale" => Modifier::greyscale(),
            "mosaic" => {
                let Some(Ok(seeds)) = parts.get(2).map(|s| s.parse::<u32>()) else {
                    writeln!(self.out, "Mosaic requires an integer seed count.")?;
                    return Ok(None);
                };
                match Modifier::mosaic(seeds) {
                    Ok(m) => m,
                    Err(e) => {
                        self.report(e)?;
                        return Ok(None);
                    }
                }
            }
            "downscale" => {
                let (Some(Ok(w)), Some(Ok(h))) = (
                    parts.get(2).map(|s| s.parse::<u32>()),
                    parts.get(3).map(|s| s.parse::<u32>()),
                ) else {
                    writeln!(self.out, "Downscale requires integer width and height.")?;
                    return Ok(None);
                };
                Modifier::downscale(w, h)
            }
            _ => {
                writeln!(self.out, "Cannot apply that modifier!")?;
                return Ok(None);
            }
        };
        Ok(Some(modifier))
    }

    fn report(&mut self, e: Error) -> Result<()> {
        crate::log_err!("command failed: {}", e);
        writeln!(self.out, "{}", e)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session<Vec<u8>> {
        Session::new(Vec::new())
    }

    fn output(session: &Session<Vec<u8>>) -> String {
        String::from_utf8_lossy(&session.out).into_owned()
    }

    #[test]
    fn create_and_apply_builds_a_stack() {
        let mut s = session();
        s.handle_line("create checkerboard 4 4 2").unwrap();
        s.handle_line("apply blur").unwrap();
        assert_eq!(s.layer().count(), 1);
        assert_eq!(output(&s), "");
    }

    #[test]
    fn unknown_command_is_reported() {
        let mut s = session();
        s.handle_line("frobnicate now").unwrap();
        assert_eq!(output(&s), "Unable to perform that operation!\n");
    }

    #[test]
    fn unknown_modifier_is_reported() {
        let mut s = session();
        s.handle_line("create checkerboard 4 4 2").unwrap();
        s.handle_line("apply vignette").unwrap();
        assert_eq!(output(&s), "Cannot apply that modifier!\n");
    }

    #[test]
    fn apply_without_images_reports_but_keeps_running() {
        let mut s = session();
        s.handle_line("apply blur").unwrap();
        assert!(s.is_running());
        assert!(output(&s).contains("invalid argument"));
    }

    #[test]
    fn downscale_routes_through_alter_layer() {
        let mut s = session();
        s.handle_line("create checkerboard 4 4 2").unwrap();
        s.handle_line("create checkerboard 4 4 2").unwrap();
        s.handle_line("apply downscale 2 2").unwrap();
        let props = s.layer().props().unwrap();
        assert_eq!((props.width, props.height), (2, 2));
        for img in s.layer().images() {
            assert_eq!((img.width(), img.height()), (2, 2));
        }
    }

    #[test]
    fn exit_stops_the_loop() {
        let mut s = session();
        let script = b"create checkerboard 2 2 1\nexit\ncreate checkerboard 2 2 1\n";
        s.run(&script[..]).unwrap();
        assert!(!s.is_running());
        assert_eq!(s.layer().count(), 1);
    }

    #[test]
    fn set_and_toggle_validate_their_index() {
        let mut s = session();
        s.handle_line("create checkerboard 2 2 1").unwrap();
        s.handle_line("set 5").unwrap();
        s.handle_line("toggle zero").unwrap();
        let text = output(&s);
        assert!(text.contains("no image at index 5"));
        assert!(text.contains("Must enter an integer after toggle."));
    }

    #[test]
    fn state_save_and_reload_through_files() {
        let dir = std::env::temp_dir();
        let state = dir.join("pixelstack_script_test.txt");
        let state_arg = state.display().to_string();

        let mut s = session();
        s.handle_line("create checkerboard 4 4 2").unwrap();
        s.handle_line("toggle 1").unwrap();
        s.handle_line(&format!("save state {}", state_arg)).unwrap();

        let mut fresh = session();
        fresh
            .handle_line(&format!("load state {}", state_arg))
            .unwrap();
        assert_eq!(fresh.layer().count(), 1);
        assert_eq!(fresh.layer().visibility(), &[false]);

        let _ = std::fs::remove_file(&state);
    }
}
