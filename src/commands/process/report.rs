use super::*;

pub fn write_process_report(
    path: &Path,
    args: &Cli,
    run_id: &str,
    started_at: &str,
    counts: &ProcessCounts,
    warnings: &[String],
) -> Result<()> {
    let report = ProcessReport {
        manifest_version: 1,
        run_id: run_id.to_string(),
        status: "completed".to_string(),
        started_at: started_at.to_string(),
        finished_at: now_utc_string(),
        command: render_process_command(args),
        mode: args.mode.as_str().to_string(),
        tool_versions: collect_tool_versions()?,
        digests: SourceDigests {
            source_sha256: sha256_file(&args.source)?,
            output_sha256: sha256_file(&args.output)?,
        },
        counts: counts.clone(),
        warnings: warnings.to_vec(),
    };

    write_json_pretty(path, &report)?;
    info!(path = %path.display(), "wrote run report");

    Ok(())
}

fn collect_tool_versions() -> Result<ToolVersions> {
    Ok(ToolVersions {
        pdftotext: command_version("pdftotext", &["-v"])?,
        ocrmypdf: command_version_optional("ocrmypdf", &["--version"]),
    })
}

fn command_version_optional(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}

fn command_version(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to run {} {}", program, args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{} {} failed: {}", program, args.join(" "), stderr.trim());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    let version_line = source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or("unknown");

    Ok(version_line.to_string())
}

pub fn render_process_command(args: &Cli) -> String {
    let mut command = vec![
        "pdftoc".to_string(),
        "--from".to_string(),
        args.source.display().to_string(),
        "--to".to_string(),
        args.output.display().to_string(),
    ];

    if args.skip_ocr {
        command.push("--skip-ocr".to_string());
    }
    if args.force_ocr {
        command.push("--force-ocr".to_string());
    }
    command.push("--lang".to_string());
    command.push(args.ocr_lang.clone());
    if args.optimize != 1 {
        command.push("--optimize".to_string());
        command.push(args.optimize.to_string());
    }
    if args.mode != ExtractionMode::Auto {
        command.push("--mode".to_string());
        command.push(args.mode.as_str().to_string());
    }
    if args.no_fix {
        command.push("--no-fix".to_string());
    }
    if let Some(path) = &args.report_path {
        command.push("--report-path".to_string());
        command.push(path.display().to_string());
    }

    command.join(" ")
}
