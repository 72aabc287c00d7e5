use clap::Parser;
use radix4::{ProfileRegistry, Radix4};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "radix4")]
#[command(version)]
#[command(
    about = "Radix4 binary-to-text codec: preserves alphabet bytes and carries the remaining bits in radix characters",
    long_about = None
)]
struct Cli {
    /// Encode using this profile
    #[arg(short = 'e', long, value_name = "PROFILE")]
    encode: Option<String>,

    /// Decode from this profile
    #[arg(short = 'd', long, value_name = "PROFILE")]
    decode: Option<String>,

    /// File to process (if not provided, reads from stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// List available profiles
    #[arg(short, long)]
    list: bool,

    /// Insert a line break every N characters
    #[arg(long, value_name = "N")]
    line_length: Option<usize>,

    /// Terminate the encoded output explicitly
    #[arg(short = 't', long)]
    terminated: bool,

    /// Disable the optimistic radix-free prefix
    #[arg(long)]
    plain: bool,

    /// Use streaming I/O for large files (memory efficient)
    #[arg(short = 's', long)]
    stream: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load profiles with user overrides
    let registry = ProfileRegistry::load_with_overrides()?;

    // Handle list command
    if cli.list {
        println!("Available profiles:\n");
        let mut profiles: Vec<_> = registry.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);

        for (name, profile) in profiles {
            let coding = match profile.build() {
                Ok(coding) => coding,
                Err(err) => {
                    println!("  {:<18} (invalid: {})", name, err);
                    continue;
                }
            };
            let layout = if coding.is_streaming() { "stream" } else { "block" };
            let mut traits = Vec::new();
            if coding.is_optimistic() {
                traits.push("optimistic".to_string());
            }
            if coding.is_terminated() {
                traits.push("terminated".to_string());
            }
            if coding.line_length() > 0 {
                traits.push(format!("lines of {}", coding.line_length()));
            }
            println!("  {:<18} {:<7} {}", name, layout, traits.join(", "));
        }
        return Ok(());
    }

    // Helper to resolve a profile and apply flag overrides
    let create_coding = |name: &str| -> Result<Radix4, Box<dyn std::error::Error>> {
        let profile = registry
            .get(name)
            .ok_or_else(|| registry.not_found(name).to_string())?;
        let mut config = profile.to_config();
        if let Some(line_length) = cli.line_length {
            config = config.line_length(line_length);
        }
        if cli.terminated {
            config = config.terminated(true);
        }
        if cli.plain {
            config = config.optimistic(false);
        }
        Ok(config.build()?)
    };

    match (&cli.decode, &cli.encode) {
        (Some(_), Some(_)) => Err("use either --encode or --decode, not both".into()),

        (Some(profile_name), None) => {
            let coding = create_coding(profile_name)?;

            if cli.stream {
                let mut output = open_output(&cli.output)?;
                if let Some(path) = &cli.file {
                    let file = fs::File::open(path)?;
                    io::copy(&mut coding.decoder_from_reader(file), &mut output)?;
                } else {
                    let stdin = io::stdin();
                    io::copy(&mut coding.decoder_from_reader(stdin.lock()), &mut output)?;
                }
            } else {
                let input = if let Some(path) = &cli.file {
                    fs::read(path)?
                } else {
                    let mut buffer = Vec::new();
                    io::stdin().read_to_end(&mut buffer)?;
                    buffer
                };
                let decoded = coding.decode_from_bytes(&input)?;
                open_output(&cli.output)?.write_all(&decoded)?;
            }
            Ok(())
        }

        (None, encode_profile) => {
            // default to the standard stream profile
            let profile_name = encode_profile.as_deref().unwrap_or("stream");
            let coding = create_coding(profile_name)?;

            if cli.stream {
                let output = open_output(&cli.output)?;
                let mut writer = coding.encoder_to_writer(output);
                if let Some(path) = &cli.file {
                    let mut file = fs::File::open(path)?;
                    io::copy(&mut file, &mut writer)?;
                } else {
                    let stdin = io::stdin();
                    io::copy(&mut stdin.lock(), &mut writer)?;
                }
                writer.close()?;
            } else {
                let input = if let Some(path) = &cli.file {
                    fs::read(path)?
                } else {
                    let mut buffer = Vec::new();
                    io::stdin().read_to_end(&mut buffer)?;
                    buffer
                };
                let encoded = coding.encode_to_string(&input)?;
                let mut output = open_output(&cli.output)?;
                output.write_all(encoded.as_bytes())?;
                output.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

fn open_output(path: &Option<PathBuf>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(path) => Ok(Box::new(fs::File::create(path)?)),
        None => Ok(Box::new(io::stdout())),
    }
}
