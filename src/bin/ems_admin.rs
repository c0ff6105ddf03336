use std::path::PathBuf;
use std::process::ExitCode;

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use clap::{Args, Parser, Subcommand};

use ems_backend::client::{
    filter_by_name, ApiClient, ClientError, EmployeeDraft, ImageAttachment, Session, SessionFile,
};
use ems_backend::models::employee::Employee;

#[derive(Parser)]
#[command(name = "ems-admin", about = "Admin client for the employee management API")]
struct Cli {
    /// Base URL of the API server.
    #[arg(long, env = "EMS_BACKEND_URL", default_value = "http://127.0.0.1:3000")]
    backend_url: String,

    /// Where the login token is kept between runs.
    #[arg(long, env = "EMS_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in as the admin and store the token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "EMS_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored token.
    Logout,
    /// List employees, optionally filtered by name.
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one employee.
    Show { id: String },
    /// Create an employee.
    Create {
        #[command(flatten)]
        fields: FieldArgs,
        #[arg(long)]
        image: PathBuf,
    },
    /// Edit an employee; omitted fields keep their current value.
    Edit {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
        #[arg(long)]
        image: Option<PathBuf>,
        /// Remove every course.
        #[arg(long, conflicts_with = "courses")]
        clear_courses: bool,
    },
    /// Delete an employee.
    Delete { id: String },
    /// Print an Argon2 hash for ADMIN_PASSWORD_HASH.
    HashPassword { password: String },
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    mobile: Option<String>,
    #[arg(long)]
    designation: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    /// Repeat for several courses.
    #[arg(long = "course")]
    courses: Vec<String>,
}

impl FieldArgs {
    fn apply_to(self, draft: &mut EmployeeDraft) {
        let FieldArgs {
            name,
            email,
            mobile,
            designation,
            gender,
            courses,
        } = self;
        for (slot, value) in [
            (&mut draft.name, name),
            (&mut draft.email, email),
            (&mut draft.mobile, mobile),
            (&mut draft.designation, designation),
            (&mut draft.gender, gender),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if !courses.is_empty() {
            draft.courses = courses;
        }
    }
}

fn print_employee(employee: &Employee) {
    println!(
        "{:<36}  {:<20}  {:<28}  {:<10}  {:<8}  {:<2}  {:<12}  {}",
        employee.id,
        employee.name,
        employee.email,
        employee.mobile,
        employee.designation,
        employee.gender,
        employee.courses.join(","),
        employee.created_at.format("%Y-%m-%d"),
    );
}

fn hash_password(password: &str) -> Result<String, ClientError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ClientError::Invalid(format!("Hashing error: {}", err)))
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    let session_file = SessionFile::new(cli.session_file.unwrap_or_else(SessionFile::default_path));
    let mut session: Session = session_file.load(&cli.backend_url)?;
    let api = ApiClient::new(&session.backend_url)?;

    match cli.command {
        Command::Login { email, password } => {
            session.token = Some(api.login(&email, &password).await?);
            session_file.save(&session)?;
            println!("Logged in as {}", email);
        }
        Command::Logout => {
            session_file.clear()?;
            println!("Logged out");
        }
        Command::List { search } => {
            let employees = api.list(&session).await?;
            let shown = filter_by_name(&employees, search.as_deref().unwrap_or_default());
            for employee in &shown {
                print_employee(employee);
            }
            println!("{} of {} employees", shown.len(), employees.len());
        }
        Command::Show { id } => {
            let employee = api.get(&session, &id).await?;
            println!("{}", serde_json::to_string_pretty(&employee)?);
        }
        Command::Create { fields, image } => {
            let mut draft = EmployeeDraft::default();
            fields.apply_to(&mut draft);
            let image = ImageAttachment::read(&image).await?;
            draft.validate(Some(&image), true)?;
            let employee = api.create(&session, &draft, image).await?;
            println!("Created employee {}", employee.id);
        }
        Command::Edit {
            id,
            fields,
            image,
            clear_courses,
        } => {
            let current = api.get(&session, &id).await?;
            let mut draft = EmployeeDraft::from(&current);
            fields.apply_to(&mut draft);
            if clear_courses {
                draft.courses.clear();
            }
            let image = match image {
                Some(path) => Some(ImageAttachment::read(&path).await?),
                None => None,
            };
            draft.validate(image.as_ref(), false)?;
            let employee = api.update(&session, &id, &draft, image).await?;
            print_employee(&employee);
        }
        Command::Delete { id } => {
            api.delete(&session, &id).await?;
            println!("Deleted employee {}", id);
        }
        Command::HashPassword { password } => {
            println!("{}", hash_password(&password)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if matches!(err, ClientError::Api { status: 401, .. }) {
                eprintln!("Session expired or invalid, run `ems-admin login` again");
            }
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
