//! Command execution for the `pulse` harness.

use crate::Commands;
use identity_backend::{AccountSeed, InMemoryIdentityBackend, Role};
use pulse_config_and_utils::Config;
use session_controller::{ControllerConfig, SessionController, SessionState, StateSubscription};
use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Read an accounts fixture: a JSON array of account seeds.
pub(crate) fn load_accounts(path: &Path) -> Result<Vec<AccountSeed>, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)?;
    let seeds: Vec<AccountSeed> = serde_json::from_str(&content)?;
    info!(count = seeds.len(), "Loaded account fixture");
    Ok(seeds)
}

/// Run one command and write every observed state to `out` as a JSON line.
pub(crate) async fn run<W: Write>(
    command: Commands,
    config: &Config,
    accounts: Vec<AccountSeed>,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Roles => write_roles(out),
        Commands::SignIn { email, password } => {
            let (controller, mut states) = start(config, accounts)?;
            let settled = controller.sign_in(&email, &password).await;
            finish(controller, &mut states, &settled, out).await
        }
        Commands::SignUp {
            email,
            password,
            name,
            role,
        } => {
            let (controller, mut states) = start(config, accounts)?;
            let settled = controller
                .sign_up_with_label(&email, &password, &name, &role)
                .await;
            finish(controller, &mut states, &settled, out).await
        }
        Commands::ResetPassword { email } => {
            let (controller, mut states) = start(config, accounts)?;
            let settled = controller.reset_password(&email).await;
            finish(controller, &mut states, &settled, out).await
        }
        Commands::SignOut => {
            let (controller, mut states) = start(config, accounts)?;
            let settled = controller.sign_out().await;
            finish(controller, &mut states, &settled, out).await
        }
    }
}

/// Build a controller over a freshly seeded backend and subscribe to it.
fn start(
    config: &Config,
    accounts: Vec<AccountSeed>,
) -> Result<(SessionController, StateSubscription), Box<dyn Error>> {
    let backend = Arc::new(InMemoryIdentityBackend::with_accounts(accounts));
    let controller = SessionController::new(backend, ControllerConfig::from(config))?;
    let states = controller.observe_state();
    Ok((controller, states))
}

async fn finish<W: Write>(
    controller: SessionController,
    states: &mut StateSubscription,
    settled: &SessionState,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    write_states(states, out)?;
    if let Some(destination) = settled.destination() {
        writeln!(out, "destination: {}", destination.route())?;
    }

    controller.shutdown().await;
    Ok(())
}

fn write_roles<W: Write>(out: &mut W) -> Result<(), Box<dyn Error>> {
    for label in Role::SELECTABLE_LABELS {
        let role = Role::from_label(label);
        writeln!(out, "{}\t{}", label, role.home_destination().route())?;
    }
    Ok(())
}

fn write_states<W: Write>(states: &mut StateSubscription, out: &mut W) -> Result<(), Box<dyn Error>> {
    while let Some(state) = states.try_next() {
        let line: String = serde_json::to_string::<SessionState>(&state)?;
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds() -> Vec<AccountSeed> {
        serde_json::from_str(
            r#"[{"id":"u1","email":"a@b.com","password":"pw","display_name":"Ada","role":"team_member"}]"#,
        )
        .unwrap()
    }

    async fn run_to_string(command: Commands, accounts: Vec<AccountSeed>) -> String {
        let mut out = Vec::new();
        run(command, &Config::default(), accounts, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_prints_states_and_destination() {
        let output = run_to_string(
            Commands::SignIn {
                email: "a@b.com".to_string(),
                password: "pw".to_string(),
            },
            seeds(),
        )
        .await;

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], r#"{"state":"unauthenticated"}"#);
        assert_eq!(lines[1], r#"{"state":"authenticating"}"#);
        assert!(lines[2].starts_with(r#"{"state":"authenticated""#));
        assert_eq!(lines[3], "destination: team_dashboard");
    }

    #[tokio::test]
    async fn test_reset_unknown_account_prints_failure() {
        let output = run_to_string(
            Commands::ResetPassword {
                email: "x@y.com".to_string(),
            },
            seeds(),
        )
        .await;

        let last = output.lines().last().unwrap();
        let state: SessionState = serde_json::from_str(last).unwrap();
        assert!(state
            .failure_message()
            .unwrap()
            .starts_with("UnknownAccount: "));
    }

    #[tokio::test]
    async fn test_sign_up_project_manager_lands_on_pm_dashboard() {
        let output = run_to_string(
            Commands::SignUp {
                email: "pm@b.com".to_string(),
                password: "secret1".to_string(),
                name: "Pat".to_string(),
                role: "Project Manager".to_string(),
            },
            Vec::new(),
        )
        .await;

        assert!(output.ends_with("destination: pm_dashboard\n"));
    }

    #[tokio::test]
    async fn test_sign_out_prints_unauthenticated_only() {
        let output = run_to_string(Commands::SignOut, seeds()).await;
        assert_eq!(output, "{\"state\":\"unauthenticated\"}\n");
    }

    #[tokio::test]
    async fn test_roles_lists_selectable_labels() {
        let output = run_to_string(Commands::Roles, Vec::new()).await;
        assert_eq!(
            output,
            "Team Member\tteam_dashboard\nProject Manager\tpm_dashboard\n"
        );
    }

    #[test]
    fn test_load_accounts_fixture() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"email":"pm@b.com","password":"secret1","display_name":"Pat","role":"project_manager"}}]"#
        )
        .unwrap();

        let seeds = load_accounts(file.path()).unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].role, Role::ProjectManager);
        assert!(seeds[0].id.is_none());
    }
}
