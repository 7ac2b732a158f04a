use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chromos::api::{ChatContext, ChromosClient};
use chromos::cli::{Args, Command};
use chromos::model::Settings;
use chromos::tui::Capabilities;
use chromos::{export, preview, tui};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chromos=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = ChromosClient::new(&args.base_url)?;

    match args.command {
        Command::Generate {
            prompt,
            colors,
            strict_ada,
            tone,
            json,
            output,
        } => {
            let settings = Settings {
                palette_length: colors,
                strict_ada,
                tone_preset: tone,
            };
            let luma = client.generate(&prompt, &settings).await?;
            if json {
                println!("{}", export::to_json(&luma)?);
            } else {
                preview::print_luma(&luma);
            }
            if let Some(path) = output {
                export::write_to(&luma, &path)?;
                eprintln!("wrote {}", path.display());
            }
        }

        Command::Chat {
            prompt,
            label,
            tags,
            tone,
        } => {
            let context = ChatContext { label, tags, tone };
            let turn = client.chat(&prompt, &context, &[]).await?;
            preview::print_isla(&turn);
        }

        Command::Fix { file, output } => {
            let mut luma = export::read_from(&file)?;
            let fixed = client.make_ada_compliant(&luma.palette).await?;
            luma.apply_fix(fixed);
            preview::print_luma(&luma);
            if let Some(path) = output {
                export::write_to(&luma, &path)?;
                eprintln!("wrote {}", path.display());
            }
        }

        Command::Tui {
            colors,
            strict_ada,
            tone,
            no_chat,
            no_ada,
            no_evolve,
        } => {
            let settings = Settings {
                palette_length: colors,
                strict_ada,
                tone_preset: tone,
            };
            let caps = Capabilities {
                chat: !no_chat,
                ada: !no_ada,
                evolve: !no_evolve,
            };
            tui::run(client, settings, caps).await?;
        }
    }

    Ok(())
}
