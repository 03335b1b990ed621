use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_lens::app::App;
use vocab_lens::camera::FileCamera;
use vocab_lens::image::CropRegion;
use vocab_lens::models::{Config, VocabularyEntry};
use vocab_lens::screens::highlight_dialogue;

#[derive(Debug, Parser)]
#[command(name = "vocab-lens")]
#[command(about = "Learn IELTS vocabulary from photos, memes and comics")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Identify the main object in a photo and explain its IELTS word.
    Lookup {
        /// Image file standing in for the camera frame.
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        /// Crop region in percent of the frame: x,y,w,h.
        #[arg(long, value_name = "X,Y,W,H", default_value = "10,10,80,80")]
        crop: CropRegion,
        /// Toggle the word in favorites.
        #[arg(long)]
        save: bool,
    },
    /// Generate a vocabulary meme.
    Meme {
        /// Optional topic; a random IELTS word is used otherwise.
        #[arg(long)]
        topic: Option<String>,
        /// Toggle the meme's word in favorites.
        #[arg(long)]
        save: bool,
    },
    /// Generate a four-panel comic teaching one word per panel.
    Comic {
        #[arg(value_name = "THEME")]
        theme: String,
    },
    /// Manage saved words.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

#[derive(Debug, Subcommand)]
enum FavoritesAction {
    List,
    Remove {
        #[arg(value_name = "WORD")]
        word: String,
    },
}

fn print_entry(entry: &VocabularyEntry) {
    println!("{}  {}", entry.word, entry.pronunciation);
    println!("  {}", entry.meaning);
    println!("  {}", entry.sentence);
    println!("  {}", entry.translation);
}

async fn run(app: &mut App, command: Command) -> vocab_lens::Result<()> {
    match command {
        Command::Lookup { image, crop, save } => {
            let camera = FileCamera::new(image);
            let entry = app.photo().capture_and_lookup(&camera, crop).await?;
            print_entry(&entry);
            app.save_images("photo", &app.photo().state())?;
            if save {
                let outcome = app.toggle_favorite(&entry)?;
                println!("{:?} '{}'", outcome, entry.word);
            }
        }
        Command::Meme { topic, save } => {
            let meme = app.meme().generate(topic.as_deref()).await?;
            println!("{}", meme.caption);
            println!("  {}", meme.context);
            print_entry(&meme.entry);
            app.meme().wait_for_visuals().await;
            app.save_images("meme", &app.meme().state())?;
            if save {
                let outcome = app.toggle_favorite(&meme.entry)?;
                println!("{:?} '{}'", outcome, meme.entry.word);
            }
        }
        Command::Comic { theme } => {
            let Some(panels) = app.comic().start_story(&theme).await? else {
                warn!("Empty theme, nothing to draw");
                return Ok(());
            };
            for panel in &panels {
                let dialogue: Vec<String> = highlight_dialogue(panel)
                    .into_iter()
                    .map(|token| {
                        if token.highlighted {
                            format!("*{}*", token.text)
                        } else {
                            token.text
                        }
                    })
                    .collect();
                println!("[{}] {}", panel.panel_number, panel.description);
                println!("  \"{}\"", dialogue.join(" "));
                println!("  {} - {}", panel.word_data.word, panel.word_data.meaning);
            }
            app.comic().wait_for_visuals().await;
            app.save_images("comic", &app.comic().state())?;
        }
        Command::Favorites { action } => match action {
            FavoritesAction::List => {
                if app.favorites().is_empty() {
                    println!("No favorites yet");
                }
                for entry in app.favorites().entries() {
                    print_entry(entry);
                }
            }
            FavoritesAction::Remove { word } => {
                if !app.remove_favorite(&word)? {
                    println!("'{}' is not in favorites", word.trim());
                }
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vocab_lens=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut app = match Config::from_env().and_then(|config| App::from_config(&config)) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match run(&mut app, args.command).await {
        Ok(()) => {
            info!("Done");
            Ok(())
        }
        Err(e) => {
            error!("Failed ({:?}): {}", e.kind(), e);
            std::process::exit(1);
        }
    }
}
