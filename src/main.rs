use std::{
    io::{self, Read, Write},
    process::ExitCode,
    time::Duration,
};

use chrono::Local;
use clap::{ArgAction, Parser};
use env_logger::Builder;
use log::{error, info, log_enabled, Level, LevelFilter};

use edidrw::{
    config::{DeviceSource, WriteConfig},
    dump_edid,
    edid::LogReporter,
    env::{Env, PosixEnv},
    program_edid, Result,
};

#[derive(Parser)]
#[command(name = "edidrw")]
#[command(version)]
#[command(
    about = "Read or write a display EDID over I2C",
    long_about = "Reads the EDID EEPROM at address 0x50 on /dev/i2c-BUS and writes it to stdout.\n\nWith --write, an EDID is read from stdin, its length and block checksums are validated and it is written to the EEPROM one byte at a time."
)]
struct Cli {
    /// I2C bus number, as in /dev/i2c-BUS
    #[arg(value_name = "BUS", required_unless_present = "std")]
    bus: Option<u32>,
    /// Write stdin to the device instead of reading it
    #[arg(short, long)]
    write: bool,
    /// Use stdin/stdout as the device, for testing without hardware
    #[arg(short = 't', long = "std")]
    std: bool,
    /// Repair bad checksums instead of refusing to write
    #[arg(short, long)]
    fix: bool,
    /// Seconds to wait after each byte written
    #[arg(short, long, value_name = "SECONDS", default_value = "0.01", value_parser = parse_delay)]
    sleep: Duration,
    /// Log more; repeat for debug output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_delay(arg: &str) -> std::result::Result<Duration, String> {
    let seconds: f64 = arg
        .parse()
        .map_err(|_| format!("`{}` is not a number of seconds", arg))?;
    Duration::try_from_secs_f64(seconds).map_err(|error| format!("`{}`: {}", arg, error))
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                Local::now().format("%Y/%m/%d-%H:%M:%S%.6f"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .init();
}

fn run<R: Read, W: Write>(cli: &Cli, env: &dyn Env, input: R, output: W) -> Result<()> {
    let source = match (cli.std, cli.bus) {
        (false, Some(bus)) => DeviceSource::Bus(bus),
        _ => DeviceSource::Stdio,
    };
    let mut device = env.open_device(source)?;

    if cli.write {
        let config = WriteConfig {
            fix_checksums: cli.fix,
            write_delay: cli.sleep,
        };
        let len = program_edid(
            device.as_mut(),
            env,
            config,
            input,
            Some(&mut LogReporter),
        )?;
        info!("wrote {} bytes to {:?}", len, source);
    } else {
        let len = dump_edid(device.as_mut(), output)?;
        info!("read {} bytes from {:?}", len, source);
    }
    Ok(())
}

/// Fatal errors always reach stderr, even when logging is filtered out.
fn exit_status(result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(error) => {
            if log_enabled!(Level::Error) {
                error!("{}", error);
            } else {
                eprintln!("{}", error);
            }
            1
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if std::env::var("RUST_LOG").is_err() {
        init_logger(cli.verbose);
    } else {
        env_logger::init();
    }

    // Unlocked handles: the stdio device takes its own locks per byte.
    let status = exit_status(run(&cli, &PosixEnv::new(), io::stdin(), io::stdout()));
    ExitCode::from(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edidrw::{env::Device, util::checksum, Error};
    use std::{cell::RefCell, io::Cursor, rc::Rc};

    type WriteLog = Rc<RefCell<Vec<(usize, u8)>>>;

    struct SharedDevice {
        contents: Vec<u8>,
        writes: WriteLog,
    }

    impl Device for SharedDevice {
        fn read(&mut self, offset: usize) -> Result<u8> {
            self.contents
                .get(offset)
                .copied()
                .ok_or_else(|| Error::io_error("read past end of device"))
        }

        fn write(&mut self, offset: usize, byte: u8) -> Result<()> {
            self.writes.borrow_mut().push((offset, byte));
            Ok(())
        }
    }

    struct TestEnv {
        contents: Vec<u8>,
        writes: WriteLog,
        opened: RefCell<Vec<DeviceSource>>,
    }

    impl TestEnv {
        fn new(contents: Vec<u8>) -> Self {
            Self {
                contents,
                writes: Rc::new(RefCell::new(vec![])),
                opened: RefCell::new(vec![]),
            }
        }

        fn writes(&self) -> Vec<(usize, u8)> {
            self.writes.borrow().clone()
        }
    }

    impl Env for TestEnv {
        fn open_device(&self, source: DeviceSource) -> Result<Box<dyn Device>> {
            self.opened.borrow_mut().push(source);
            Ok(Box::new(SharedDevice {
                contents: self.contents.clone(),
                writes: self.writes.clone(),
            }))
        }

        fn sleep_for(&self, _duration: Duration) {}
    }

    fn base_block() -> Vec<u8> {
        let mut data: Vec<u8> = (0..128).map(|index| (index * 5) as u8).collect();
        data[18] = 1;
        data[126] = 0;
        data[127] = checksum::value(&data);
        data
    }

    fn run_write(args: &[&str], input: Vec<u8>) -> (u8, TestEnv) {
        let cli = Cli::try_parse_from(args).unwrap();
        let env = TestEnv::new(vec![]);
        let status = exit_status(run(&cli, &env, Cursor::new(input), io::sink()));
        (status, env)
    }

    #[test]
    fn test_exit_status_good_write() {
        let data = base_block();
        let (status, env) = run_write(&["edidrw", "-t", "-w", "-s", "0"], data.clone());
        assert_eq!(0, status);
        let expected: Vec<(usize, u8)> = data.into_iter().enumerate().collect();
        assert_eq!(expected, env.writes());
        assert_eq!(vec![DeviceSource::Stdio], *env.opened.borrow());
    }

    #[test]
    fn test_exit_status_bad_checksum() {
        let mut data = base_block();
        data[127] = data[127].wrapping_add(1);
        let (status, env) = run_write(&["edidrw", "-t", "-w", "-s", "0"], data.clone());
        assert_eq!(1, status);
        assert!(env.writes().is_empty());

        let (status, env) = run_write(&["edidrw", "-t", "-w", "-f", "-s", "0"], data);
        assert_eq!(0, status);
        assert_eq!(128, env.writes().len());
        assert_eq!(base_block()[127], env.writes()[127].1);
    }

    #[test]
    fn test_exit_status_unknown_version() {
        let mut data = base_block();
        data[18] = 3;
        let (status, env) = run_write(&["edidrw", "7", "-w", "-f", "-s", "0"], data);
        assert_eq!(1, status);
        assert!(env.writes().is_empty());
        assert_eq!(vec![DeviceSource::Bus(7)], *env.opened.borrow());
    }

    #[test]
    fn test_help_describes_every_flag() {
        use clap::CommandFactory;

        let help = Cli::command().render_help().to_string();
        for text in [
            "I2C bus number",
            "Write stdin to the device",
            "Use stdin/stdout as the device",
            "Repair bad checksums",
            "Seconds to wait",
            "Log more",
        ] {
            assert!(help.contains(text), "missing `{}` in:\n{}", text, help);
        }
    }

    #[test]
    fn test_read_mode_copies_device() {
        let data = base_block();
        let cli = Cli::try_parse_from(["edidrw", "-t"]).unwrap();
        let env = TestEnv::new(data.clone());
        let mut output = vec![];
        let status = exit_status(run(&cli, &env, io::empty(), &mut output));
        assert_eq!(0, status);
        assert_eq!(data, output);
        assert!(env.writes().is_empty());
    }

    #[test]
    fn test_parse_delay() {
        assert_eq!(Duration::from_millis(500), parse_delay("0.5").unwrap());
        assert_eq!(Duration::ZERO, parse_delay("0").unwrap());
        assert!(parse_delay("-1").is_err());
        assert!(parse_delay("soon").is_err());
        assert!(parse_delay("inf").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["edidrw", "3"]).unwrap();
        assert_eq!(Some(3), cli.bus);
        assert!(!cli.write && !cli.std && !cli.fix);
        assert_eq!(Duration::from_millis(10), cli.sleep);
    }

    #[test]
    fn test_cli_bus_required_without_std() {
        assert!(Cli::try_parse_from(["edidrw"]).is_err());
        let cli = Cli::try_parse_from(["edidrw", "--std", "-w", "-f", "-s", "0"]).unwrap();
        assert!(cli.std && cli.write && cli.fix);
        assert_eq!(None, cli.bus);
        assert_eq!(Duration::ZERO, cli.sleep);
    }
}
