use chrono::Local;
use env_logger::{Builder, Env, Target};
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};

// Copies log output to stdout and, when it could be opened, a log file
struct Tee {
    file: Option<File>,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        if let Some(f) = &mut self.file {
            f.write_all(buf)?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        if let Some(f) = &mut self.file {
            f.flush()?;
        }

        Ok(())
    }
}

pub fn init(log_file: &str) {
    let (file, open_error) = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file) {
        Ok(f) => (Some(f), None),
        Err(e) => (None, Some(e)),
    };

    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(buf, "{} [{}] {}",
                     Local::now().format("%Y-%m-%d %H:%M:%S"),
                     record.level(), record.args())
        })
        .target(Target::Pipe(Box::new(Tee { file: file })))
        .try_init();

    if let Some(e) = open_error {
        warn!("Cannot open log file {}: {}, logging to stdout only",
              log_file, e);
    }
}
