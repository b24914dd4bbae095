use clap::{Parser, Subcommand};
use records_core::{
    CodeEntry, Codes, CollectionLocks, CombinedEntry, CoreConfig, Diagnosis, Patient,
    RecordStore, Role, User,
};
use serde_json::Map;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "records")]
#[command(about = "Clinical records store CLI")]
struct Cli {
    /// Directory holding the collection files
    #[arg(long, global = true, env = "RECORDS_DATA_DIR")]
    data_dir: Option<String>,

    /// Directory whose codes.json overrides the data directory copy
    #[arg(long, global = true, env = "RECORDS_REFERENCE_DIR")]
    reference_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset the store to the demo data set
    Seed,
    /// List all patients
    ListPatients,
    /// List patients then diagnoses, as the clinician view shows them
    ListRecords {
        /// Print each record as a FHIR collection bundle
        #[arg(long = "fhir")]
        as_fhir: bool,
    },
    /// Print an argon2 hash for a password
    HashPassword {
        /// Plain-text password
        password: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'records --help' for commands");
        return Ok(());
    };

    let open_store = move || -> anyhow::Result<RecordStore> {
        let cfg = CoreConfig::from_values(cli.data_dir, cli.reference_dir)?;
        Ok(RecordStore::new(
            Arc::new(cfg),
            Arc::new(CollectionLocks::new()),
        ))
    };

    match command {
        Commands::Seed => seed(&open_store()?)?,
        Commands::ListPatients => {
            let patients = open_store()?.load_patients();
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!(
                    "ID: {}, Name: {}, DOB: {}",
                    patient.id,
                    patient.name,
                    patient.dob.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::ListRecords { as_fhir } => {
            let records = open_store()?.combined_view();
            if records.is_empty() {
                println!("No records found.");
            }
            for record in &records {
                if as_fhir {
                    println!("{}", fhir::render_json(&fhir::record_to_bundle(record))?);
                } else {
                    println!("{}", describe(record));
                }
            }
        }
        Commands::HashPassword { password } => {
            println!("{}", api_shared::hash_password(&password)?);
        }
    }

    Ok(())
}

fn describe(record: &CombinedEntry) -> String {
    match record {
        CombinedEntry::Patient(p) => format!("[patient {}] {}", p.id, p.name),
        CombinedEntry::Diagnosis(d) => format!(
            "[diagnosis {}] patient {}: {} / {} {}",
            d.id,
            d.patient_id,
            d.namaste_code,
            d.icd11_code,
            d.note.as_deref().unwrap_or("")
        ),
    }
}

/// Overwrite users, patients, diagnoses and codes with the demo set, and drop all sessions.
fn seed(store: &RecordStore) -> anyhow::Result<()> {
    let users = vec![
        User {
            username: "clinician1".into(),
            role: Role::Clinician,
            id: "C1".into(),
            password_hash: api_shared::hash_password("clinic123")?,
        },
        User {
            username: "ravi".into(),
            role: Role::Patient,
            id: "101".into(),
            password_hash: api_shared::hash_password("mav1234")?,
        },
    ];
    store.save(&users)?;

    store.save(&[Patient {
        id: 101,
        name: "Ravi Kumar".into(),
        dob: Some("1988-07-12".into()),
        gender: Some("male".into()),
        contact: Some("9999999999".into()),
        extra: Map::new(),
    }])?;

    store.save(&[Diagnosis {
        id: 1001,
        patient_id: 101,
        namaste_code: "NAM-001".into(),
        icd11_code: "CA22".into(),
        note: Some("Initial consult: fever and cough".into()),
        timestamp: String::new(),
        extra: Map::new(),
    }])?;

    store.save_codes(&sample_codes())?;
    store.clear_sessions()?;

    println!("Seeded {}", store.config().data_dir().display());
    println!("Users: clinician1 / clinic123 and ravi / mav1234");
    println!("Patient id for ravi: 101");
    Ok(())
}

fn entries(pairs: &[(&str, &str)]) -> Vec<CodeEntry> {
    pairs
        .iter()
        .map(|(code, display)| CodeEntry::new(*code, *display))
        .collect()
}

fn sample_codes() -> Codes {
    Codes {
        namaste: entries(&[
            ("NAM-001", "Fever"),
            ("NAM-002", "Headache"),
            ("NAM-003", "Cough"),
            ("NAM-004", "Tuberculosis"),
            ("NAM-005", "Hypertension"),
            ("NAM-006", "Diabetes mellitus"),
            ("NAM-007", "Chronic obstructive pulmonary disease"),
            ("NAM-008", "Asthma"),
            ("NAM-009", "Ischaemic heart disease"),
            ("NAM-010", "Stroke"),
        ]),
        icd11: entries(&[
            ("1A04", "Typhoid fever"),
            ("1E40", "Dengue"),
            ("1F40", "Malaria"),
            ("CA40", "Pneumonia, unspecified"),
            ("CA22", "Acute upper respiratory infection"),
            ("CA23", "Asthma"),
            ("CA25", "Chronic obstructive pulmonary disease"),
            ("5A11", "Hypertension"),
            ("5A13", "Diabetes mellitus, type 2"),
            ("BA40", "Ischaemic heart disease"),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store(temp_dir: &TempDir) -> RecordStore {
        let cfg = CoreConfig::new(temp_dir.path().join("data"), None).expect("valid config");
        RecordStore::new(Arc::new(cfg), Arc::new(CollectionLocks::new()))
    }

    #[test]
    fn seed_writes_demo_set() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = temp_store(&temp_dir);
        let old = User {
            username: "old".into(),
            role: Role::Patient,
            id: String::new(),
            password_hash: String::new(),
        };
        store
            .create_session("stale", &old)
            .expect("create stale session");

        seed(&store).expect("seed");

        let ravi = store.find_user("ravi").expect("ravi seeded");
        assert!(api_shared::verify_password("mav1234", &ravi.password_hash));
        assert_eq!(store.get_patient(101).expect("patient").name, "Ravi Kumar");
        assert_eq!(store.records_for_patient("101").len(), 2);
        assert_eq!(store.codes().namaste.len(), 10);
        assert_eq!(store.codes().icd11.len(), 10);
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn seeding_twice_resets_rather_than_duplicates() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = temp_store(&temp_dir);

        seed(&store).expect("first seed");
        seed(&store).expect("second seed");

        assert_eq!(store.load_users().len(), 2);
        assert_eq!(store.load_patients().len(), 1);
        assert_eq!(store.load_diagnoses().len(), 1);
    }

    #[test]
    fn cli_parses_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["records", "list-records", "--fhir", "--data-dir", "/tmp/x"])
            .expect("parse");

        assert_eq!(cli.data_dir.as_deref(), Some("/tmp/x"));
        assert!(matches!(cli.command, Some(Commands::ListRecords { as_fhir: true })));
    }
}
