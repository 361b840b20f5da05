use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, info};
use wait_timeout::ChildExt;

use crate::error::{ReleaseError, Result};
use crate::settings::ReleaseSettings;

/// Runs the external publish process for the configured solution.
///
/// The command is invoked as `<publish_command> publish <solution>`, with a
/// `-p:PublishProfile=<profile>` argument appended when a profile path is
/// configured and exists as a file. Standard output is streamed line by line
/// to the log at info level; the call blocks until the process exits.
///
/// With a configured timeout the process is killed once the limit passes and
/// an error is returned. The pipeline treats every error from this function
/// as a soft failure.
pub fn run_publish(settings: &ReleaseSettings) -> Result<()> {
    info!("Start release build process.");

    let mut command = Command::new(&settings.publish_command);
    command.arg("publish").arg(&settings.solution_file);

    if let Some(profile) = &settings.publish_profile_file {
        if profile.is_file() {
            command.arg(format!("-p:PublishProfile={}", profile.display()));
        }
    }

    let mut child = command.stdout(Stdio::piped()).spawn()?;

    let reader = child.stdout.take().map(|stdout| {
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines().map_while(|line| line.ok()) {
                if !line.trim().is_empty() {
                    info!("{}", line);
                }
            }
        })
    });

    let status = match settings.publish_timeout {
        Some(limit) => match child.wait_timeout(limit)? {
            Some(status) => status,
            None => {
                child.kill()?;
                child.wait()?;
                if let Some(handle) = reader {
                    let _ = handle.join();
                }
                return Err(ReleaseError::publish(format!(
                    "no exit within {} seconds, process killed",
                    limit.as_secs()
                )));
            }
        },
        None => child.wait()?,
    };

    if let Some(handle) = reader {
        let _ = handle.join();
    }
    debug!("Process done.");

    if !status.success() {
        return Err(ReleaseError::publish(format!(
            "process exited with {}",
            status
        )));
    }

    Ok(())
}
