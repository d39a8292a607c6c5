use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};

use hulpwijzer::applications::ApplicationFlow;
use hulpwijzer::config::AppConfig;
use hulpwijzer::context::AppContext;
use hulpwijzer::i18n::Locale;
use hulpwijzer::profile::{FieldValue, RequiredField, SendOutcome};
use hulpwijzer::programs::project_schemes;
use hulpwijzer::session::Mode;

const HELP: &str = "\
Commands:
  <text>               talk to the assistant (or answer the active application)
  /profile             show your profile and what is still missing
  /set <field> <value> edit a profile field
  /clear               empty the profile
  /programs            list programs from the last reply
  /apply <program-id>  start (or continue) an application
  /done                leave the active application
  /apps                list started applications
  /step <id> <n>       set an application's current step
  /email <name> <addr> leave contact details for application updates
  /session             reload the session from the server
  /reset               start over (clears the profile too)
  /lang <en|nl>        switch language
  /quit                exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;
    eprintln!("🧭 Hulpwijzer v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Service: {}", config.api_url);
    eprintln!("   Data: {}", config.data_dir.display());
    eprintln!("   Type /help for commands.\n");

    let ctx = AppContext::from_config(config)?.install()?;
    run(ctx).await
}

async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut flow: Option<ApplicationFlow> = None;

    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match command {
            "/quit" | "/exit" => break,
            "/help" => println!("{HELP}"),
            "/profile" => show_profile(ctx).await,
            "/set" => match rest.split_once(' ') {
                Some((field, value)) => {
                    if RequiredField::from_key(field).is_none() {
                        eprintln!("ℹ️  {field} is not one of the required fields; saving anyway");
                    }
                    ctx.profile.update_field(field, FieldValue::parse_input(value)).await;
                    show_profile(ctx).await;
                }
                None => eprintln!("usage: /set <field> <value>"),
            },
            "/clear" => {
                ctx.profile.clear().await;
                println!("Profile cleared.");
            }
            "/programs" => show_programs(ctx).await,
            "/apply" => {
                flow = start_flow(ctx, rest);
            }
            "/done" => {
                flow = None;
                println!("Back to the eligibility conversation.");
            }
            "/apps" => show_applications(ctx),
            "/step" => match rest.split_once(' ').map(|(id, n)| (id, n.trim().parse::<u32>())) {
                Some((id, Ok(step))) => {
                    if !ctx.applications.update_progress(id, step) {
                        eprintln!("No application for program {id}");
                    }
                    show_applications(ctx);
                }
                _ => eprintln!("usage: /step <program-id> <step>"),
            },
            "/email" => save_contact(ctx, flow.as_ref(), rest),
            "/session" => match ctx.profile.refresh_session().await {
                Ok(true) => println!("Session reloaded (mode: {:?}).", ctx.profile.mode().await),
                Ok(false) => println!("Nothing to reload. Say something first."),
                Err(e) => eprintln!("❌ {e}"),
            },
            "/reset" => {
                flow = None;
                ctx.profile.reset_session().await;
                println!("Started over.");
            }
            "/lang" => match rest.parse::<Locale>() {
                Ok(locale) => {
                    ctx.translations.set_locale(locale);
                    println!("Language: {locale}");
                }
                Err(e) => eprintln!("{e}"),
            },
            _ if command.starts_with('/') => eprintln!("Unknown command. Type /help."),
            _ => match flow.as_mut() {
                Some(active) => answer_flow(ctx, active, line),
                None => chat(ctx, line).await,
            },
        }
    }

    Ok(())
}

async fn chat(ctx: &AppContext, text: &str) {
    let outcome = ctx.profile.send_utterance(text).await;
    if outcome == SendOutcome::Skipped {
        return;
    }
    if let Some(reply) = ctx.profile.messages().await.last() {
        println!("\n{}\n", reply.content);
    }
    if outcome == SendOutcome::Replied && ctx.profile.mode().await == Mode::Results {
        show_programs(ctx).await;
    }
}

async fn show_profile(ctx: &AppContext) {
    let t = &ctx.translations;
    let profile = ctx.profile.profile().await;
    println!("{}", t.t("profile.title"));
    for field in RequiredField::ALL {
        let value = match profile.get(field.key()) {
            Some(FieldValue::Bool(true)) => t.t("profile.values.yes"),
            Some(FieldValue::Bool(false)) => t.t("profile.values.no"),
            Some(v) if !v.is_blank() => v.to_string(),
            _ => t.t("profile.values.missing"),
        };
        println!("  {:<24} {}", t.t(&field.label_key()), value);
    }
    for (field, value) in profile.iter().filter(|(k, _)| RequiredField::from_key(k).is_none()) {
        println!("  {field:<24} {value}");
    }
    let progress = profile.progress();
    println!(
        "  {}",
        t.t_with(
            "profile.progress",
            &[
                ("completed", progress.completed.to_string().as_str()),
                ("total", progress.total.to_string().as_str()),
            ],
        )
    );
}

async fn show_programs(ctx: &AppContext) {
    let t = &ctx.translations;
    if !ctx.profile.is_complete().await {
        println!("{}\n{}", t.t("results.noData.title"), t.t("results.noData.description"));
        return;
    }
    let programs = project_schemes(&ctx.profile.candidate_programs().await);
    if programs.is_empty() {
        println!("{}", t.t("results.empty"));
        return;
    }
    for program in programs {
        println!(
            "  [{}] {} ({}, {}): {} (~{} min)",
            program.id,
            program.title,
            program.category,
            t.t(program.confidence.label_key()),
            program.description,
            program.application_time
        );
    }
}

fn save_contact(ctx: &AppContext, flow: Option<&ApplicationFlow>, rest: &str) {
    let t = &ctx.translations;
    let Some((name, email)) = rest.rsplit_once(' ') else {
        eprintln!("usage: /email <name> <email>");
        return;
    };
    let (program_id, title_key) = flow
        .map(|f| (f.program().program_id.as_str(), f.program().title_key.as_str()))
        .unwrap_or(("", ""));
    match ctx.contact.save(name, email, program_id, title_key) {
        Ok(details) => {
            println!("{}", t.t("emailCapture.saved"));
            println!("  {}", details.banner(t));
        }
        Err(e) => {
            tracing::debug!(error = %e, "Contact details rejected");
            eprintln!("{}", t.t(e.message_key()));
        }
    }
}

fn show_applications(ctx: &AppContext) {
    let t = &ctx.translations;
    let applications = ctx.applications.applications();
    println!("{}", t.t("applications.title"));
    if let Some(banner) = ctx.contact.banner(t) {
        println!("  ✉️  {banner}");
    }
    if applications.is_empty() {
        println!("  {}", t.t("applications.empty.title"));
        return;
    }
    let now = Utc::now();
    for app in applications {
        println!(
            "  [{}] {}: {} {}, {} {}% ({}/{})",
            app.program_id,
            t.t(&app.title_key),
            t.t("applications.startedOn"),
            app.started_label(now, t),
            t.t("application.progress"),
            app.progress,
            app.current_step,
            app.total_steps,
        );
    }
}

fn start_flow(ctx: &AppContext, program_id: &str) -> Option<ApplicationFlow> {
    let t = &ctx.translations;
    let Some(flow) = ApplicationFlow::start(program_id, &ctx.catalog, t) else {
        eprintln!("{}", t.t("application.programNotFound"));
        return None;
    };
    ctx.start_application(program_id);
    let flow = match ctx.applications.get_application(program_id) {
        Some(existing) => flow.resume_at(existing.current_step),
        None => flow,
    };

    println!("\n{}", t.t(&flow.program().title_key));
    for message in flow.messages() {
        println!("{}", message.content);
    }
    print_steps(ctx, &flow);
    Some(flow)
}

fn answer_flow(ctx: &AppContext, flow: &mut ApplicationFlow, text: &str) {
    let t = &ctx.translations;
    if let Some(reply) = flow.respond(text, t) {
        println!("\n{}\n", reply.content);
    }
    ctx.applications
        .update_progress(&flow.program().program_id, flow.current_step());
    print_steps(ctx, flow);
}

fn print_steps(ctx: &AppContext, flow: &ApplicationFlow) {
    let t = &ctx.translations;
    println!("{} {}%", t.t("application.progress"), flow.progress());
    for step in flow.steps(t) {
        let marker = if step.completed {
            "✓"
        } else if step.current {
            "→"
        } else {
            " "
        };
        println!("  {marker} {}", step.label);
    }
}
