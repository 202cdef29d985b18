use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use quillpost::app::App;
use quillpost::backend::BackendError;
use quillpost::config::{BackendConfig, ConfigError};
use quillpost::forms::FormError;
use quillpost::forms::editor::PostEditor;
use quillpost::forms::progress::{self, DEFAULT_TICK, UploadProgress};
use quillpost::model::{ImageFile, PostStatus};
use quillpost::routes::{GuardDecision, Route, nav_items};
use quillpost::services::content::ContentError;
use quillpost::services::session::SessionError;
use quillpost::views::all_posts::AllPostsView;
use quillpost::views::edit_post::{EditLoad, load_editor};
use quillpost::views::post::{PostDetail, PostLoad};
use quillpost::views::{PostCard, ViewError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("{0}")]
    Form(#[from] FormError),
    #[error("{0}")]
    Content(#[from] ContentError),
    #[error("{0}")]
    View(#[from] ViewError),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("redirected to {0}")]
    Redirected(Route),
    #[error("no page at {0}")]
    UnknownRoute(String),
}

#[derive(Parser, Debug)]
#[command(name = "quillpost", about = "Blog client for an Appwrite-hosted backend")]
struct Cli {
    /// Sign in with these credentials before running the command.
    #[arg(long, env = "QUILL_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "QUILL_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    /// Use a throwaway in-memory backend instead of the configured one.
    #[arg(long, default_value_t = false, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        name: String,
    },
    /// Check the credentials.
    Login,
    Whoami,
    Logout,
    Posts(PostsCommand),
    /// Show the guard decision and navigation for an app path.
    Route { path: String },
    PreviewUrl { file_id: String },
}

#[derive(Args, Debug)]
struct PostsCommand {
    #[command(subcommand)]
    command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostsSubcommand {
    List {
        /// Case-insensitive title filter.
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        slug: String,
    },
    Create {
        #[arg(long)]
        title: String,
        /// Defaults to the slug derived from the title.
        #[arg(long)]
        slug: Option<String>,
        /// HTML body file.
        #[arg(long)]
        content: PathBuf,
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value = "active")]
        status: PostStatus,
    },
    Edit {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<PathBuf>,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        status: Option<PostStatus>,
    },
    Delete {
        slug: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = if cli.offline {
        App::in_memory().0
    } else {
        App::from_config(&BackendConfig::from_env()?)?
    };

    // Registering signs in by itself; everything else starts from the given
    // credentials or an existing session.
    let registering = matches!(cli.command, Command::Register { .. });
    match (&cli.email, &cli.password) {
        (Some(email), Some(password)) if !registering => sign_in(&app, email, password).await?,
        _ => {
            app.start().await;
        }
    }

    match cli.command {
        Command::Register { name } => run_register(&app, cli.email.as_deref(), cli.password.as_deref(), name).await,
        Command::Login => {
            print_whoami(&app);
            Ok(())
        }
        Command::Whoami => {
            print_whoami(&app);
            Ok(())
        }
        Command::Logout => {
            app.logout().await?;
            println!("signed out");
            Ok(())
        }
        Command::Posts(posts) => run_posts(&app, posts).await,
        Command::Route { path } => run_route(&app, &path).await,
        Command::PreviewUrl { file_id } => {
            println!("{}", app.content().file_preview_url(&file_id));
            Ok(())
        }
    }
}

async fn sign_in(app: &App, email: &str, password: &str) -> Result<(), CliError> {
    let mut form = app.login_form();
    form.email = email.to_owned();
    form.password = password.to_owned();
    form.submit().await?;
    Ok(())
}

fn guard(app: &App, route: &Route) -> Result<(), CliError> {
    match app.guard().check(route) {
        GuardDecision::Redirect(target) => Err(CliError::Redirected(target)),
        GuardDecision::Render | GuardDecision::Loading => Ok(()),
    }
}

fn print_whoami(app: &App) {
    match app.auth().user() {
        Some(user) => println!("{} <{}> ({})", user.name, user.email, user.id),
        None => println!("not signed in"),
    }
}

async fn run_register(app: &App, email: Option<&str>, password: Option<&str>, name: String) -> Result<(), CliError> {
    guard(app, &Route::Signup)?;
    let mut form = app.signup_form();
    form.name = name;
    form.email = email.unwrap_or_default().to_owned();
    form.password = password.unwrap_or_default().to_owned();
    form.submit().await?;
    print_whoami(app);
    Ok(())
}

async fn run_route(app: &App, path: &str) -> Result<(), CliError> {
    let (route, decision) = app.navigate(path).await.ok_or_else(|| CliError::UnknownRoute(path.to_owned()))?;
    match decision {
        GuardDecision::Render => println!("render {route}"),
        GuardDecision::Redirect(target) => println!("redirect {route} -> {target}"),
        GuardDecision::Loading => println!("loading {route}"),
    }
    let labels: Vec<&str> = nav_items(&app.auth().status()).iter().map(|item| item.label).collect();
    println!("nav: {}", labels.join(" | "));
    Ok(())
}

// =============================================================================
// POSTS
// =============================================================================

async fn run_posts(app: &App, posts: PostsCommand) -> Result<(), CliError> {
    match posts.command {
        PostsSubcommand::List { search } => {
            guard(app, &Route::AllPosts)?;
            let mut view = AllPostsView::load(app.content()).await?;
            if let Some(search) = search {
                view.set_query(search);
            }
            let visible = view.visible();
            if visible.is_empty() {
                println!("no posts");
            }
            for card in visible {
                print_card(card);
            }
            Ok(())
        }
        PostsSubcommand::Show { slug } => {
            let route = Route::Post(slug.clone());
            guard(app, &route)?;
            match PostDetail::load(app.content(), app.auth(), &slug).await? {
                PostLoad::Found(detail) => {
                    print_detail(&detail);
                    Ok(())
                }
                PostLoad::Redirect(target) => Err(CliError::Redirected(target)),
            }
        }
        PostsSubcommand::Create { title, slug, content, image, status } => {
            guard(app, &Route::AddPost)?;
            let mut editor = app.new_post_editor();
            editor.set_title(title);
            if let Some(slug) = slug {
                editor.set_slug(&slug);
            }
            editor.set_content(read_text(&content).await?);
            editor.set_image(Some(read_image(&image).await?));
            editor.set_status(status);
            submit_with_progress(&mut editor).await
        }
        PostsSubcommand::Edit { slug, title, content, image, status } => {
            guard(app, &Route::EditPost(slug.clone()))?;
            let mut editor = match load_editor(app.content(), app.auth(), &slug).await? {
                EditLoad::Editor(editor) => editor,
                EditLoad::Redirect(target) => return Err(CliError::Redirected(target)),
            };
            if let Some(title) = title {
                editor.set_title(title);
            }
            if let Some(content) = content {
                editor.set_content(read_text(&content).await?);
            }
            if let Some(image) = image {
                editor.set_image(Some(read_image(&image).await?));
            }
            if let Some(status) = status {
                editor.set_status(status);
            }
            submit_with_progress(&mut editor).await
        }
        PostsSubcommand::Delete { slug } => {
            guard(app, &Route::Post(slug.clone()))?;
            match PostDetail::load(app.content(), app.auth(), &slug).await? {
                PostLoad::Found(detail) => {
                    let next = detail.delete(app.content(), app.auth()).await?;
                    println!("deleted {slug}; next {next}");
                    Ok(())
                }
                PostLoad::Redirect(target) => Err(CliError::Redirected(target)),
            }
        }
    }
}

async fn submit_with_progress(editor: &mut PostEditor) -> Result<(), CliError> {
    let (progress_tx, mut progress_rx) = watch::channel(UploadProgress::default());
    let animation = tokio::spawn(progress::animate(editor.subscribe(), progress_tx, DEFAULT_TICK));
    let printer = tokio::spawn(async move {
        while progress_rx.changed().await.is_ok() {
            let percent = progress_rx.borrow_and_update().percent();
            eprint!("\rsaving... {percent:>3}%");
        }
        eprintln!();
    });

    let result = editor.submit().await;
    // Submit always leaves the editor settled, which ends the animation and
    // with it the printer.
    let _ = animation.await;
    let _ = printer.await;

    let route = result?;
    println!("saved; open {route}");
    Ok(())
}

async fn read_text(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::ReadFile { path: path.to_path_buf(), source })
}

async fn read_image(path: &Path) -> Result<ImageFile, CliError> {
    ImageFile::from_path(path)
        .await
        .map_err(|source| CliError::ReadFile { path: path.to_path_buf(), source })
}

fn print_card(card: &PostCard) {
    println!(
        "{}\t{}\t{}\t{}",
        card.id,
        card.title,
        card.author,
        card.date.as_deref().unwrap_or("-")
    );
    println!("    {}", card.excerpt);
}

fn print_detail(detail: &PostDetail) {
    println!("{}", detail.post.title);
    println!(
        "by {} | {} | {} | {}",
        detail.author,
        detail.date.as_deref().unwrap_or("-"),
        detail.reading_time,
        detail.post.status
    );
    println!("image: {}", detail.image_url);
    if detail.is_author {
        println!("edit: {}", detail.edit_route());
    }
    println!();
    println!("{}", detail.post.content);
}
