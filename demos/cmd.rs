use std::io::{self, Write};

use cmap::{CMap, ConcurrentMap};

pub fn run() -> cmap::Result<()> {
    println!("Welcome to cmap!");

    let cm = CMap::new()?;

    loop {
        let mut cmd = String::new();
        print!("> ");
        io::stdout().flush()?;

        if io::stdin().read_line(&mut cmd)? == 0 {
            break;
        }

        let cmds: Vec<&str> = cmd.split_whitespace().collect();

        match cmds.first().copied() {
            Some("exit") => break,
            Some("help") => help(),
            Some("set" | "get" | "rm" | "stats") => {
                process_command(&cm, &cmds)?;
            }
            None => {}
            Some(_) => {
                println!("unknown command, try `help`");
            }
        };
    }

    cm.close()?;
    println!("Bye!");

    Ok(())
}

fn process_command(cm: &CMap, cmds: &[&str]) -> cmap::Result<()> {
    match cmds {
        ["set", key, value] => {
            cm.put(key.to_string(), value.to_string())?;
        }
        ["get", key] => match cm.get(key)? {
            Some(value) => println!("{}", value),
            None => println!("(not found)"),
        },
        ["rm", key] => {
            if !cm.delete(key)? {
                println!("(not found)");
            }
        }
        ["stats"] => println!("{:?}", cm.stats()?),
        _ => help(),
    };

    Ok(())
}

fn help() {
    println!("help  -- show help");
    println!("get   -- get key value, by: <key>");
    println!("set   -- set key value, by: <key> <value>");
    println!("rm    -- remove key value, by: <key>");
    println!("stats -- show worker counters");
    println!("exit  -- exit command");
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
