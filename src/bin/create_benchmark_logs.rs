use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Creates benchmark access logs with the specified number of lines.
/// Every line follows the combined log format so all of them are counted.
fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <number-of-lines> <output-file>", args[0]);
        std::process::exit(1);
    }

    let num_lines: usize = match args[1].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Invalid number of lines: {}", args[1]);
            std::process::exit(1);
        }
    };
    let file_path = &args[2];

    println!("Creating access log with {} lines at {}", num_lines, file_path);
    create_benchmark_logs(num_lines, file_path)?;
    println!("Log file created successfully.");

    Ok(())
}

fn create_benchmark_logs(lines: usize, file_path: &str) -> io::Result<()> {
    if let Some(parent) = Path::new(file_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = BufWriter::new(File::create(file_path)?);

    for i in 0..lines {
        let method = match i % 10 {
            0..=6 => "GET",
            7 | 8 => "POST",
            _ => "DELETE",
        };

        let resource = match i % 8 {
            0 => "/index.html",
            1 => "/login",
            2 => "/about.html",
            3 => "/api/orders",
            4 => "/api/orders/42",
            5 => "/static/app.js",
            6 => "/static/style.css",
            _ => "/favicon.ico",
        };

        let status = match i % 20 {
            0 => 404,
            1 => 500,
            2 => 302,
            3 => 403,
            _ => 200,
        };

        let agent = match i % 3 {
            0 => "Mozilla/5.0 (X11; Linux x86_64)",
            1 => "curl/8.4.0",
            _ => "Wget/1.21.4",
        };

        writeln!(
            file,
            "10.{}.{}.{} - - [{:02}/Nov/2024:{:02}:{:02}:{:02} +0000] \"{} {} HTTP/1.1\" {} {} \"-\" \"{}\"",
            (i / 65536) % 256,
            (i / 256) % 256,
            i % 256,
            (i % 30) + 1,     // Day (1-30)
            (i / 3600) % 24,  // Hour (0-23)
            (i / 60) % 60,    // Minute (0-59)
            i % 60,           // Second (0-59)
            method,
            resource,
            status,
            (i * 37) % 50_000,
            agent
        )?;
    }

    file.flush()
}
