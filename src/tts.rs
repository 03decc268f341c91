use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context;
use tracing::{debug, error};

use crate::timeline::SpeakerRole;

/// Piper voice model per speaker role.
#[derive(Debug, Clone)]
pub struct VoiceModels {
    pub narrator: String,
    pub commentator: String,
}

impl VoiceModels {
    pub fn for_role(&self, role: SpeakerRole) -> &str {
        match role {
            SpeakerRole::Narrator => &self.narrator,
            SpeakerRole::Commentator => &self.commentator,
        }
    }
}

pub fn tts_generate_chunk(model: &str, text: &str, out_path: &Path) -> anyhow::Result<()> {
    debug!("Calling Piper TTS ({}) for {}", model, out_path.display());
    let mut child = Command::new("piper")
        .arg("--model")
        .arg(model)
        .arg("--output_file")
        .arg(out_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn()
        .context("Failed to spawn piper process")?;

    {
        let stdin = child.stdin.as_mut().context("Failed to open piper stdin")?;
        stdin.write_all(text.as_bytes())?;
    }

    let status = child.wait()?;
    if !status.success() {
        error!("Piper TTS command failed for chunk: {}", out_path.display());
        anyhow::bail!("TTS engine failed for chunk, command returned non-zero");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_model_by_role() {
        let voices = VoiceModels {
            narrator: "amy.onnx".into(),
            commentator: "joe.onnx".into(),
        };
        assert_eq!(voices.for_role(SpeakerRole::Narrator), "amy.onnx");
        assert_eq!(voices.for_role(SpeakerRole::Commentator), "joe.onnx");
    }
}
