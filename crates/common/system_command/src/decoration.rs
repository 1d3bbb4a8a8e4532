use crate::SystemCommand;
use std::io::Write;

/// Brackets the raw output of a command with begin/end markers.
///
/// The begin marker is written on creation and the end marker when the guard is dropped,
/// hence also when the execution of the command fails half-way.
pub struct Decoration<W: Write> {
    writer: W,
    command_line: String,
}

impl<W: Write> Decoration<W> {
    pub fn begin(mut writer: W, command: &SystemCommand) -> Self {
        let command_line = command.to_string();
        let _ = writeln!(writer, "----- [begin] $ {command_line}");
        let _ = writer.flush();
        Decoration {
            writer,
            command_line,
        }
    }
}

impl<W: Write> Drop for Decoration<W> {
    fn drop(&mut self) {
        let _ = writeln!(self.writer, "----- [end] $ {}", self.command_line);
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_surround_the_scope() {
        let command = SystemCommand::new("snap").args(["install", "lxd"]);
        let mut out: Vec<u8> = Vec::new();
        {
            let _decoration = Decoration::begin(&mut out, &command);
        }

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "----- [begin] $ snap \"install\" \"lxd\"\n----- [end] $ snap \"install\" \"lxd\"\n"
        );
    }

    #[test]
    fn end_marker_is_written_on_early_return() {
        fn failing_step(out: &mut Vec<u8>) -> Result<(), std::io::Error> {
            let _decoration = Decoration::begin(out, &SystemCommand::new("yum"));
            std::fs::read("/non/existent/file")?;
            Ok(())
        }

        let mut out = Vec::new();
        assert!(failing_step(&mut out).is_err());

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("----- [begin] $ yum\n"));
        assert!(out.ends_with("----- [end] $ yum\n"));
    }
}
