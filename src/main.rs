//! # offerdoc CLI
//!
//! Usage:
//!   offerdoc job.json                 # writes Offer_Letter_<name>.pdf
//!   offerdoc job.json -o letter.pdf
//!   cat job.json | offerdoc - --html -o preview.html
//!   offerdoc job.json --content      # resolved markup to stdout
//!   offerdoc --example > job.json

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;

use offerdoc::{export_filename, OfferError, OfferJob};

/// offerdoc - render offer letters to PDF
#[derive(Parser, Debug)]
#[command(name = "offerdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Job file (JSON). Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Output path (defaults to Offer_Letter_<name>.pdf or .html)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write the HTML preview instead of a PDF
    #[arg(long, conflicts_with = "content")]
    html: bool,

    /// Print the resolved letter body to stdout
    #[arg(long)]
    content: bool,

    /// Print an example job and exit
    #[arg(long)]
    example: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), OfferError> {
    if cli.example {
        print!("{}", example_job_json());
        return Ok(());
    }

    let input = read_input(cli.input.as_deref())?;
    let job: OfferJob = serde_json::from_str(&input)?;

    if cli.content {
        let content = offerdoc::job_content(&job)?;
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }

    let (bytes, default_name) = if cli.html {
        let html = offerdoc::preview_job(&job)?;
        (html.into_bytes(), export_filename(&job.candidate.name, "html"))
    } else {
        let document = offerdoc::render_job(&job)?;
        log::info!("{} page(s)", document.page_count);
        (document.bytes, document.filename)
    };

    let output = cli.output.unwrap_or_else(|| PathBuf::from(default_name));
    write_atomically(&output, &bytes)?;
    eprintln!("✓ Written {} bytes to {}", bytes.len(), output.display());
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String, OfferError> {
    match path {
        Some(p) if p != Path::new("-") => Ok(fs::read_to_string(p)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Write to a sibling temp file and rename it over `path`, so a failed
/// write never leaves a truncated document behind.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), OfferError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| OfferError::Config(format!("invalid output path {}", path.display())))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".partial");
    let tmp = path.with_file_name(tmp_name);

    if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn example_job_json() -> &'static str {
    r##"{
  "candidate": {
    "id": "c-001",
    "name": "Jane Q. Smith",
    "email": "jane@example.com",
    "role": "Senior Engineer",
    "offerDate": "2026-11-01",
    "status": "Pending"
  },
  "templates": [
    {
      "id": "t-standard",
      "name": "Standard Offer",
      "isDefault": true,
      "content": "<h1>Offer of Employment</h1><p>Dear {{name}},</p><p>We are delighted to offer you the position of <strong>{{role}}</strong> at {{companyName}}, starting <em>{{offerDate}}</em>.</p><ul><li>Competitive salary</li><li>Health coverage</li></ul><p class=\"ql-align-right\">{{senderName}}<br>{{senderEmail}}</p>"
    }
  ],
  "companySettings": {
    "info": {
      "name": "Acme Corp",
      "address": "123 Business St, Suite 100",
      "website": "https://acme.example",
      "phone": "+1 555 0100"
    },
    "branding": {
      "logoUrl": "",
      "primaryColor": "#1a73e8"
    },
    "emailConfig": {
      "senderName": "Alex Rivera",
      "senderEmail": "hr@acme.example"
    }
  },
  "page": {
    "size": "A4",
    "margin": 20,
    "lineHeight": 7
  }
}
"##
}
