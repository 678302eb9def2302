use std::io::{BufRead, IsTerminal, Read, Write};

use clap::Parser;

use tickle::{status_code, BoundedAllocator, GetOpt, Interp, InterpOptions, OptToken};

#[derive(Parser)]
#[command(name = "tickle")]
#[command(about = "A tiny embeddable command language")]
#[command(version)]
struct Cli {
    /// Execute the script from a command line argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// Bound the interpreter's heap usage in bytes
    #[arg(long = "memory")]
    memory: Option<usize>,

    /// Output the final result as JSON (result, code)
    #[arg(long = "json")]
    json: bool,

    /// Script file to execute
    #[arg()]
    script_file: Option<String>,
}

/// Host commands wrapping operating-system facilities. These live in
/// the binary; the library core never touches the OS.
fn register_host_commands(i: &mut Interp) -> tickle::Status {
    i.register_command("puts", |i, argv| {
        let mut opt = GetOpt::new();
        let mut newline = true;
        loop {
            match opt.next(argv, "n") {
                OptToken::Opt('n', _) => newline = false,
                OptToken::Opt(..) => {}
                OptToken::End => break,
                OptToken::Error(ch) => {
                    return Err(i.error(format!("Unknown option -{}", ch)));
                }
            }
        }
        let rest = &argv[opt.index..];
        if rest.len() != 1 {
            return Err(i.arity_error(2, argv));
        }
        if newline {
            println!("{}", rest[0]);
        } else {
            print!("{}", rest[0]);
            let _ = std::io::stdout().flush();
        }
        i.clear_result();
        Ok(())
    })?;

    i.register_command("gets", |i, argv| {
        if argv.len() != 1 {
            return Err(i.arity_error(1, argv));
        }
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(_) => i.set_result(line.trim_end_matches(['\r', '\n'])),
            Err(e) => Err(i.error(format!("gets: {}", e))),
        }
    })?;

    i.register_command("getenv", |i, argv| {
        if argv.len() != 2 {
            return Err(i.arity_error(2, argv));
        }
        let value = std::env::var(&argv[1]).unwrap_or_default();
        i.set_result(&value)
    })?;

    i.register_command("system", |i, argv| {
        if argv.len() != 2 {
            return Err(i.arity_error(2, argv));
        }
        match std::process::Command::new("sh").arg("-c").arg(&argv[1]).status() {
            Ok(status) => i.set_result_integer(status.code().unwrap_or(-1) as i64),
            Err(e) => Err(i.error(format!("system: {}", e))),
        }
    })?;

    i.register_command("exit", |i, argv| {
        if argv.len() != 2 {
            return Err(i.arity_error(2, argv));
        }
        let code = i.number(&argv[1])?;
        std::process::exit(code as i32);
    })?;

    i.register_command("random", |i, argv| {
        if argv.len() != 1 {
            return Err(i.arity_error(1, argv));
        }
        i.set_result_integer(rand::random::<u32>() as i64)
    })?;

    i.register_command("clock", |i, argv| {
        use chrono::format::{Item, StrftimeItems};
        if argv.len() != 2 {
            return Err(i.arity_error(2, argv));
        }
        let items: Vec<Item> = StrftimeItems::new(&argv[1]).collect();
        if items.iter().any(|it| matches!(it, Item::Error)) {
            return Err(i.error(format!("Invalid clock format: {}", argv[1])));
        }
        let now = chrono::Utc::now();
        let formatted = now.format_with_items(items.into_iter()).to_string();
        i.set_result(&formatted)
    })?;

    i.register_command("source", |i, argv| {
        if argv.len() != 2 {
            return Err(i.arity_error(2, argv));
        }
        let text = match std::fs::read_to_string(&argv[1]) {
            Ok(t) => t,
            Err(e) => return Err(i.error(format!("source: {}: {}", argv[1], e))),
        };
        i.eval(&text)
    })?;

    Ok(())
}

fn repl(i: &mut Interp) {
    let stdin = std::io::stdin();
    loop {
        print!("tickle> ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let status = i.eval(&line);
        if !i.result().is_empty() {
            println!("[{}] {}", status_code(&status), i.result());
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut interp = Interp::new(InterpOptions {
        allocator: cli.memory.map(|limit| {
            Box::new(BoundedAllocator::new(limit)) as Box<dyn tickle::Allocator>
        }),
        ..Default::default()
    });
    if register_host_commands(&mut interp).is_err() {
        eprintln!("Error: {}", interp.result());
        std::process::exit(1);
    }

    let script = if let Some(s) = cli.script {
        s
    } else if let Some(ref file) = cli.script_file {
        match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error: cannot read script file: {}: {}", file, e);
                std::process::exit(1);
            }
        }
    } else if std::io::stdin().is_terminal() {
        repl(&mut interp);
        return;
    } else {
        let mut buf = String::new();
        let _ = std::io::stdin().read_to_string(&mut buf);
        buf
    };

    let status = interp.eval(&script);
    let code = status_code(&status);

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "result": interp.result(),
                "code": code,
            })
        );
    } else if !interp.result().is_empty() {
        println!("{}", interp.result());
    }

    std::process::exit(if code == 0 { 0 } else { 1 });
}
