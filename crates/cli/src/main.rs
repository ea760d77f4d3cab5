mod context;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context as _};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nhcx_convert::{
    detect_from_text, guess_from_filename, highlight, save_bundle, select_pdf_files,
    ClaimMetadata, ConvertClient, ConvertTextRequest, HiType,
};
use triage_client::ApiError;
use triage_core::{
    await_terminal, doctor_view, load_audio, nurse_view, spawn_watcher, PollPolicy, WatcherHandle,
    DOCTOR_QUEUE_INTERVAL, EHR_REFRESH_INTERVAL, NURSE_QUEUE_INTERVAL,
};
use triage_types::{ExportedRecord, HospitalId, PatientId, Role, Session, TriageCase, VitalSigns};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Hospital triage console: intake, nursing, review, EHR and claims")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Staff sign-in ID (e.g. nur_01)
        hospital_id: String,
        #[arg(long, env = "TRIAGE_PASSWORD")]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the stored session and verify it with the service
    Whoami,
    /// Triage service liveness
    Health,
    /// Receptionist intake workspace
    #[command(subcommand)]
    Intake(IntakeCmd),
    /// Nursing station workspace
    #[command(subcommand)]
    Nurse(NurseCmd),
    /// Doctor review workspace
    #[command(subcommand)]
    Doctor(DoctorCmd),
    /// Mock EHR record viewer
    #[command(subcommand)]
    Ehr(EhrCmd),
    /// NHCX claim converter
    #[command(subcommand)]
    Convert(ConvertCmd),
}

#[derive(Subcommand)]
enum IntakeCmd {
    /// Upload a recorded complaint and start the triage pipeline
    Submit {
        /// Patient identifier (e.g. P-001)
        patient_id: String,
        /// Recorded complaint audio file
        #[arg(long)]
        audio: PathBuf,
        /// Consultation language; defaults to the patient's preference
        #[arg(long)]
        language: Option<String>,
        /// Poll the case status until processing completes (2 min ceiling)
        #[arg(long)]
        wait: bool,
    },
}

#[derive(Subcommand)]
enum NurseCmd {
    /// Cases still needing vitals or in the pipeline
    Queue {
        /// Keep refreshing the queue until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Record vital signs on a case
    Vitals {
        case_id: String,
        /// Celsius
        #[arg(long, default_value_t = 37.0)]
        temperature: f64,
        /// Systolic blood pressure (mmHg)
        #[arg(long, default_value_t = 120)]
        systolic: i32,
        /// Diastolic blood pressure (mmHg)
        #[arg(long, default_value_t = 80)]
        diastolic: i32,
        /// Beats per minute
        #[arg(long, default_value_t = 75)]
        heart_rate: i32,
        /// Breaths per minute
        #[arg(long, default_value_t = 16)]
        respiratory_rate: i32,
        /// Percentage
        #[arg(long, default_value_t = 98)]
        oxygen_saturation: i32,
    },
}

#[derive(Subcommand)]
enum DoctorCmd {
    /// Cases awaiting review or already finalized
    Queue {
        #[arg(long)]
        watch: bool,
        /// Restrict the queue to one specialty
        #[arg(long)]
        specialty: Option<String>,
    },
    /// Full case view: transcription, vitals and SOAP draft
    Review { case_id: String },
    /// Save a SOAP note draft (unspecified sections keep their draft text)
    Soap {
        case_id: String,
        #[arg(long)]
        subjective: Option<String>,
        #[arg(long)]
        objective: Option<String>,
        #[arg(long)]
        assessment: Option<String>,
        #[arg(long)]
        plan: Option<String>,
    },
    /// Save the current SOAP draft, then approve the triage
    Finalize { case_id: String },
    /// Start the background FHIR export of a finalized case
    Export { case_id: String },
}

#[derive(Subcommand)]
enum EhrCmd {
    /// All exported FHIR records
    List {
        #[arg(long)]
        watch: bool,
    },
    /// Parsed clinical content plus the raw bundle of one patient's record
    Show {
        patient_id: String,
        /// Print only the highlighted raw bundle
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Args, Debug, Default)]
struct ClaimMetaArgs {
    #[arg(long)]
    patient_name: Option<String>,
    #[arg(long)]
    patient_id: Option<String>,
    #[arg(long)]
    insurer_name: Option<String>,
    #[arg(long)]
    policy_number: Option<String>,
}

impl ClaimMetaArgs {
    fn into_metadata(self) -> ClaimMetadata {
        ClaimMetadata {
            patient_name: self.patient_name,
            patient_id: self.patient_id,
            insurer_name: self.insurer_name,
            policy_number: self.policy_number,
        }
    }
}

#[derive(Subcommand)]
enum ConvertCmd {
    /// Conversion service status and model availability
    Health,
    /// Convert one or more clinical PDFs into an NHCX claim bundle
    Files {
        /// PDF files to convert
        files: Vec<PathBuf>,
        #[command(flatten)]
        meta: ClaimMetaArgs,
        /// Directory the bundle file is written to
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Skip printing the highlighted bundle
        #[arg(long)]
        quiet: bool,
    },
    /// Convert pasted clinical text (from a file or stdin)
    Text {
        /// Read the text from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Classification hint (e.g. discharge_summary); omit to auto-detect
        #[arg(long)]
        document_type: Option<HiType>,
        #[command(flatten)]
        meta: ClaimMetaArgs,
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[arg(long)]
        quiet: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("triage_cli=info,triage_client=info,triage_core=info,nhcx_convert=info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Login {
            hospital_id,
            password,
        } => login(&hospital_id, &password).await?,
        Commands::Logout => {
            context::store().logout()?;
            println!("Signed out.");
        }
        Commands::Whoami => whoami().await?,
        Commands::Health => {
            let status = context::client()?.ping().await?;
            println!("{}: {}", status.status, status.message);
        }
        Commands::Intake(cmd) => intake(cmd).await?,
        Commands::Nurse(cmd) => nurse(cmd).await?,
        Commands::Doctor(cmd) => doctor(cmd).await?,
        Commands::Ehr(cmd) => ehr(cmd).await?,
        Commands::Convert(cmd) => convert(cmd).await?,
    }

    Ok(())
}

async fn login(hospital_id: &str, password: &str) -> anyhow::Result<()> {
    let hospital_id = HospitalId::new(hospital_id)?;
    let client = context::client()?;
    let auth = client.login(&hospital_id, password).await?;

    let session = Session::new(auth.token, auth.user);
    context::store().login(&session)?;

    let user = &session.user;
    println!("Signed in as {} ({})", user.name, user.role);
    // The role decides where the login screen would have redirected.
    match user.role {
        Role::Receptionist => println!("Workspace: `triage intake submit` to start an intake."),
        Role::Nurse => println!("Workspace: `triage nurse queue` to see waiting patients."),
        Role::Doctor => println!("Workspace: `triage doctor queue` to see cases for review."),
    }
    Ok(())
}

async fn whoami() -> anyhow::Result<()> {
    let session = context::store()
        .load()
        .context("not signed in; run `triage login <hospital-id>` first")?;
    let user = &session.user;
    println!(
        "{} ({}, id {}){}",
        user.name,
        user.role,
        user.hospital_id,
        user.specialty
            .as_deref()
            .map(|s| format!(", specialty {s}"))
            .unwrap_or_default()
    );

    match context::client()?.me(&session.token).await {
        Ok(remote) => {
            let expires = chrono::DateTime::from_timestamp(remote.expires_at, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| remote.expires_at.to_string());
            println!("Token verified by the service; expires {expires}.");
        }
        Err(ApiError::Unauthorized) => {
            println!("The service rejected the stored token; run `triage login` again.");
        }
        Err(e) => println!("Could not verify the token right now: {e}"),
    }
    Ok(())
}

async fn intake(cmd: IntakeCmd) -> anyhow::Result<()> {
    let IntakeCmd::Submit {
        patient_id,
        audio,
        language,
        wait,
    } = cmd;
    let _ = context::require_role(Role::Receptionist)?;
    let client = context::client()?;

    let patient_id = PatientId::new(&patient_id)?;
    let language = match language {
        Some(language) => language,
        None => match client.patient(patient_id.as_str()).await {
            Ok(patient) => {
                println!("Patient {}: {}", patient.hospital_id, patient.name);
                patient.preferred_language
            }
            // Walk-ins are not registered; intake proceeds either way.
            Err(ApiError::NotFound(_)) => "English".into(),
            Err(e) => {
                tracing::warn!("patient lookup failed: {e}");
                "English".into()
            }
        },
    };

    let blob = load_audio(&audio)?;
    println!(
        "Uploading {} ({} bytes, {})",
        blob.file_name,
        blob.len(),
        blob.media_type
    );
    let case = client.create_case(&patient_id, &language, blob).await?;
    println!("Triage started: case {} (status {})", case.id, case.status);

    if wait {
        println!("Waiting for the pipeline (up to 2 minutes)...");
        let poll_client = client.clone();
        let case_id = case.id.clone();
        let result = await_terminal(PollPolicy::default(), move || {
            let client = poll_client.clone();
            let id = case_id.clone();
            async move { client.case(&id).await }
        })
        .await;

        match result {
            Ok(done) => {
                println!("Processing complete.");
                render::case_detail(&done);
            }
            Err(e) => bail!("{e}; the case stays queued; check `triage nurse queue` later"),
        }
    }
    Ok(())
}

async fn nurse(cmd: NurseCmd) -> anyhow::Result<()> {
    match cmd {
        NurseCmd::Queue { watch } => {
            let _ = context::require_role(Role::Nurse)?;
            let client = context::client()?;
            if watch {
                let fetcher = client.clone();
                let handle = spawn_watcher(NURSE_QUEUE_INTERVAL, move || {
                    let client = fetcher.clone();
                    async move { client.queue(None).await.map(nurse_view) }
                });
                watch_queue("Nursing station", NURSE_QUEUE_INTERVAL, handle).await
            } else {
                render::queue(&nurse_view(client.queue(None).await?));
                Ok(())
            }
        }
        NurseCmd::Vitals {
            case_id,
            temperature,
            systolic,
            diastolic,
            heart_rate,
            respiratory_rate,
            oxygen_saturation,
        } => {
            let session = context::require_role(Role::Nurse)?;
            let client = context::client()?;
            let vitals = VitalSigns {
                temperature,
                blood_pressure_systolic: systolic,
                blood_pressure_diastolic: diastolic,
                heart_rate,
                respiratory_rate,
                oxygen_saturation,
                recorded_at: Utc::now(),
                recorded_by: session.user.id,
            };
            let case = client.submit_vitals(&case_id, &vitals).await?;
            println!("Vitals saved.");
            render::case_detail(&case);
            Ok(())
        }
    }
}

async fn doctor(cmd: DoctorCmd) -> anyhow::Result<()> {
    let _ = context::require_role(Role::Doctor)?;
    let client = context::client()?;

    match cmd {
        DoctorCmd::Queue { watch, specialty } => {
            if watch {
                let fetcher = client.clone();
                let handle = spawn_watcher(DOCTOR_QUEUE_INTERVAL, move || {
                    let client = fetcher.clone();
                    let specialty = specialty.clone();
                    async move { client.queue(specialty.as_deref()).await.map(doctor_view) }
                });
                watch_queue("Review queue", DOCTOR_QUEUE_INTERVAL, handle).await
            } else {
                render::queue(&doctor_view(client.queue(specialty.as_deref()).await?));
                Ok(())
            }
        }
        DoctorCmd::Review { case_id } => {
            render::case_detail(&client.case(&case_id).await?);
            Ok(())
        }
        DoctorCmd::Soap {
            case_id,
            subjective,
            objective,
            assessment,
            plan,
        } => {
            let case = client.case(&case_id).await?;
            let mut note = case.soap_note.unwrap_or_default();
            if let Some(s) = subjective {
                note.subjective = s;
            }
            if let Some(o) = objective {
                note.objective = o;
            }
            if let Some(a) = assessment {
                note.assessment = a;
            }
            if let Some(p) = plan {
                note.plan = p;
            }
            client.save_soap(&case_id, &note).await?;
            println!("Draft saved.");
            Ok(())
        }
        DoctorCmd::Finalize { case_id } => {
            // Save the current draft first, then approve.
            let case = client.case(&case_id).await?;
            if let Some(note) = &case.soap_note {
                client.save_soap(&case_id, note).await?;
            }
            let case = client.finalize(&case_id).await?;
            println!("Triage approved (status {}). It can now be exported to the EHR.", case.status);
            Ok(())
        }
        DoctorCmd::Export { case_id } => {
            client.export(&case_id).await?;
            println!("Export started; the FHIR record appears in `triage ehr list` once conversion completes.");
            Ok(())
        }
    }
}

async fn ehr(cmd: EhrCmd) -> anyhow::Result<()> {
    let client = context::client()?;
    match cmd {
        EhrCmd::List { watch } => {
            if watch {
                let fetcher = client.clone();
                let handle = spawn_watcher(EHR_REFRESH_INTERVAL, move || {
                    let client = fetcher.clone();
                    async move { client.ehr_records().await }
                });
                watch_records(EHR_REFRESH_INTERVAL, handle).await
            } else {
                render::records(&client.ehr_records().await?);
                Ok(())
            }
        }
        EhrCmd::Show { patient_id, raw } => {
            let record = client
                .ehr_records()
                .await?
                .into_iter()
                .filter(|r| r.patient_id == patient_id)
                .max_by_key(|r| r.exported_at);
            let record = match record {
                Some(record) => record,
                None => bail!("no exported record for patient {patient_id}"),
            };

            if !raw {
                render::record_detail(&record);
                println!();
            }
            println!("{}", highlight(&record.fhir_bundle));
            Ok(())
        }
    }
}

async fn convert(cmd: ConvertCmd) -> anyhow::Result<()> {
    let client = ConvertClient::new(&context::convert_url())?;
    match cmd {
        ConvertCmd::Health => {
            let health = client.health().await?;
            let model = if health.medgemma_available {
                "Available"
            } else {
                "Unavailable (fallback)"
            };
            println!(
                "Online ({} v{}) | MedGemma: {model} | Profile: {}",
                health.status, health.version, health.fhir_profile
            );
            Ok(())
        }
        ConvertCmd::Files {
            files,
            meta,
            out,
            quiet,
        } => {
            let selection = select_pdf_files(&files);
            for name in &selection.rejected {
                println!("skipping {name}: only PDF files are accepted");
            }
            if selection.is_empty() {
                bail!("no PDF files to convert");
            }
            for path in &selection.accepted {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                println!("  {name} [{}]", guess_from_filename(name).label());
            }

            let response = client
                .convert_files(&selection.accepted, &meta.into_metadata())
                .await?;
            render::convert_outcome(&response);

            let saved = save_bundle(&response.fhir_bundle, &out)?;
            println!("Bundle written to {}", saved.display());
            if !quiet {
                println!("{}", highlight(&response.fhir_bundle));
            }
            Ok(())
        }
        ConvertCmd::Text {
            file,
            document_type,
            meta,
            out,
            quiet,
        } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    use std::io::Read as _;
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            if text.trim().is_empty() {
                bail!("no clinical text provided");
            }

            let (local_guess, _) = detect_from_text(&text, document_type);
            println!("Local keyword guess: {}", local_guess.label());

            let mut request = ConvertTextRequest::new(text).with_metadata(&meta.into_metadata());
            request.document_type = document_type;
            let response = client.convert_text(&request).await?;
            render::convert_outcome(&response);

            let saved = save_bundle(&response.fhir_bundle, &out)?;
            println!("Bundle written to {}", saved.display());
            if !quiet {
                println!("{}", highlight(&response.fhir_bundle));
            }
            Ok(())
        }
    }
}

/// Prints a fresh snapshot once per interval until interrupted.
async fn watch_queue(
    title: &str,
    interval: Duration,
    handle: WatcherHandle<TriageCase>,
) -> anyhow::Result<()> {
    loop {
        tokio::time::sleep(interval).await;
        let cases = handle.latest().await;
        println!(
            "\n{title} | {} active @ {}",
            cases.len(),
            chrono::Local::now().format("%H:%M:%S")
        );
        render::queue(&cases);
    }
}

async fn watch_records(
    interval: Duration,
    handle: WatcherHandle<ExportedRecord>,
) -> anyhow::Result<()> {
    loop {
        tokio::time::sleep(interval).await;
        let records = handle.latest().await;
        println!(
            "\nExported records | {} @ {}",
            records.len(),
            chrono::Local::now().format("%H:%M:%S")
        );
        render::records(&records);
    }
}
