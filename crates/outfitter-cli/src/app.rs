//! Command handlers. Each one drives a screen controller from the core
//! library and prints its outcome.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};

use outfitter_core::config::Config;
use outfitter_core::models::GarmentType;
use outfitter_core::screens::{
    auth_gate, CaptureScreen, ChatScreen, LoginScreen, Notice, ProfileScreen, RegisterScreen,
    Route, Services,
};
use outfitter_core::{ApiClient, KeyringStore};

use crate::chat::{self, ChatCommand};

pub struct App {
    config: Config,
    services: Services,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(config.api_config()?)?;
        info!(backend = api.base_url(), "API client configured");

        let services = Services::new(Arc::new(api), Arc::new(KeyringStore::default()));
        Ok(Self { config, services })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = match email.or_else(|| self.config.last_email.clone()) {
            Some(last) => prompt_with_default("Email", &last)?,
            None => prompt("Email")?,
        };

        let mut screen = LoginScreen::new(Some(email));
        screen.password = rpassword::prompt_password("Password: ")?;

        println!("\nSigning in...");
        let route = screen.submit(&self.services).await.map_err(notice_error)?;
        self.remember_email(&screen.email);
        self.announce(route)
    }

    pub async fn register(&mut self, email: Option<String>) -> Result<()> {
        let mut screen = RegisterScreen::new();
        screen.email = match email {
            Some(email) => email,
            None => prompt("Email")?,
        };
        screen.password = rpassword::prompt_password("Password: ")?;

        println!("\nCreating account...");
        match screen.submit(&self.services).await.map_err(notice_error)? {
            Route::Login { email } => {
                println!("An account already exists for this email. Please log in.");
                self.login(email).await
            }
            route => {
                self.remember_email(&screen.email);
                self.announce(route)
            }
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        let mut profile = ProfileScreen::load(&self.services);
        profile.sign_out(&self.services).map_err(notice_error)?;
        println!("Signed out.");
        Ok(())
    }

    pub fn profile(&self) -> Result<()> {
        self.require_sign_in()?;
        let profile = ProfileScreen::load(&self.services);
        println!("Profile");
        println!("  Email: {}", profile.display_email());
        Ok(())
    }

    pub fn status(&self) -> Result<()> {
        let backend = self.config.api_config()?;
        println!("Backend:   {}", backend.base_url());
        let state = if self.services.session.is_authenticated() {
            "signed in"
        } else {
            "signed out"
        };
        println!("Session:   {}", state);
        Ok(())
    }

    // =========================================================================
    // Wardrobe
    // =========================================================================

    pub async fn upload(&self, path: &Path, garment: GarmentType) -> Result<()> {
        self.require_sign_in()?;

        let image = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;

        let mut screen = CaptureScreen::new();
        screen.set_photo(image);
        screen.select_type(garment);

        println!("Uploading {} as {}...", path.display(), garment.display_name());
        screen.submit(&self.services).await.map_err(notice_error)?;
        println!("Added to your wardrobe.");
        Ok(())
    }

    pub async fn chat(&self) -> Result<()> {
        self.require_sign_in()?;

        let mut screen = ChatScreen::new();
        println!("Ask for outfit ideas. Type /help for commands.\n");

        loop {
            let Some(line) = read_line("you> ")? else {
                break;
            };

            match ChatCommand::parse(&line) {
                ChatCommand::Quit => break,
                ChatCommand::Help => chat::print_help(),
                ChatCommand::Reset => {
                    screen.reset();
                    println!("(conversation cleared)");
                }
                ChatCommand::Next(garment) => step_gallery(&mut screen, &garment, 1),
                ChatCommand::Prev(garment) => step_gallery(&mut screen, &garment, -1),
                ChatCommand::Save(dir) => match screen.gallery() {
                    Some(gallery) => {
                        let saved = chat::save_gallery(gallery, &dir)?;
                        println!("Saved {} image(s) to {}", saved.len(), dir.display());
                    }
                    None => println!("(no outfit images to save)"),
                },
                ChatCommand::Unknown(cmd) => println!("Unknown command {}. Type /help.", cmd),
                ChatCommand::Message(text) => {
                    if screen.send(&text, &self.services).await {
                        if let Some(turn) = screen.conversation().last() {
                            println!("stylist> {}", turn.content);
                        }
                        if let Some(gallery) = screen.gallery() {
                            chat::print_gallery(gallery);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn require_sign_in(&self) -> Result<()> {
        match auth_gate(&self.services.session, &Route::Main) {
            Some(Route::Login { .. }) => bail!("Not signed in. Run `outfitter login` first."),
            _ => Ok(()),
        }
    }

    fn announce(&self, route: Route) -> Result<()> {
        match route {
            Route::Main => {
                println!("Signed in successfully!");
                Ok(())
            }
            other => Err(anyhow!("Unexpected route after sign-in: {:?}", other)),
        }
    }

    fn remember_email(&mut self, email: &str) {
        self.config.last_email = Some(email.trim().to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }
}

fn step_gallery(screen: &mut ChatScreen, garment: &str, delta: isize) {
    match screen.gallery_mut() {
        Some(gallery) => {
            gallery.move_by(garment, delta);
            match gallery.counter(garment) {
                Some(counter) => println!("{}: {}", garment, counter),
                None => println!("(no {} images)", garment),
            }
        }
        None => println!("(no outfit images to browse)"),
    }
}

/// Turn a screen notice into an error for the command's exit status
fn notice_error(notice: Notice) -> anyhow::Error {
    if notice.requires_sign_in() {
        anyhow!("{}: {}. Run `outfitter login`.", notice.title, notice.message)
    } else {
        anyhow!("{}: {}", notice.title, notice.message)
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]", label, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Read one line; `None` on end of input
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin().read_line(&mut input)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input))
}
