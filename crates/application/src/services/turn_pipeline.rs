//! Turn pipeline - Orchestrates one conversational turn
//!
//! A turn moves through transcription, dialogue and synthesis:
//! 1. Stage the uploaded audio, transcribe it, discard the upload
//! 2. Build the tutor prompt and ask the dialogue backend once
//! 3. Synthesize the reply and store it as a fetchable artifact
//! 4. Serve the artifact once, or let the sweep reclaim it
//!
//! Every port failure is returned to the caller. Nothing is retried.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use domain::{
    ArtifactId, AudioFormat, ChatMessage, ConversationTurn, HistoryWindow, TurnState,
    TurnTracker,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{ApplicationError, FailureKind},
    ports::{
        ArtifactContent, DialoguePort, MediaStorePort, SynthesisPort, TranscriptionPort,
        TranscriptionResult,
    },
};

/// Configuration for the turn pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPipelineConfig {
    /// Bound applied to caller-supplied history before prompting
    pub history_window: HistoryWindow,
    /// Delete an artifact as soon as it has been fetched
    pub reclaim_on_fetch: bool,
}

impl Default for TurnPipelineConfig {
    fn default() -> Self {
        Self {
            history_window: HistoryWindow::default(),
            reclaim_on_fetch: true,
        }
    }
}

/// Result of a text chat turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    /// Tutor reply text
    pub response: String,
    /// Artifact holding the spoken reply
    pub audio: ArtifactId,
}

/// Result of a full audio-in, audio-out turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceTurnOutcome {
    /// What the learner said
    pub transcription: String,
    /// Tutor reply text
    pub response: String,
    /// Artifact holding the spoken reply
    pub audio: ArtifactId,
    /// States the turn passed through
    pub states: Vec<TurnState>,
}

/// Convert caller-supplied `(role, content)` pairs into chat messages
///
/// Unknown roles and blank content are input errors of the dialogue step.
pub fn parse_history<'a, I>(entries: I) -> Result<Vec<ChatMessage>, ApplicationError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(index, (role, content))| {
            ChatMessage::parse(role, content).map_err(|e| {
                ApplicationError::dialogue(FailureKind::Input, format!("history[{index}]: {e}"))
            })
        })
        .collect()
}

/// Service driving conversational turns through the ports
pub struct TurnPipeline {
    transcriber: Arc<dyn TranscriptionPort>,
    dialogue: Arc<dyn DialoguePort>,
    synthesizer: Arc<dyn SynthesisPort>,
    media: Arc<dyn MediaStorePort>,
    config: TurnPipelineConfig,
}

impl fmt::Debug for TurnPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TurnPipeline {
    /// Create a turn pipeline with default configuration
    pub fn new(
        transcriber: Arc<dyn TranscriptionPort>,
        dialogue: Arc<dyn DialoguePort>,
        synthesizer: Arc<dyn SynthesisPort>,
        media: Arc<dyn MediaStorePort>,
    ) -> Self {
        Self::with_config(
            transcriber,
            dialogue,
            synthesizer,
            media,
            TurnPipelineConfig::default(),
        )
    }

    /// Create a turn pipeline with custom configuration
    pub fn with_config(
        transcriber: Arc<dyn TranscriptionPort>,
        dialogue: Arc<dyn DialoguePort>,
        synthesizer: Arc<dyn SynthesisPort>,
        media: Arc<dyn MediaStorePort>,
        config: TurnPipelineConfig,
    ) -> Self {
        Self {
            transcriber,
            dialogue,
            synthesizer,
            media,
            config,
        }
    }

    /// Get the pipeline configuration
    pub const fn config(&self) -> &TurnPipelineConfig {
        &self.config
    }

    /// Transcribe an uploaded audio blob
    ///
    /// The blob is staged through the media store and the staged file is
    /// discarded before this returns, whatever the outcome. If the call is
    /// abandoned part-way, dropping the staged upload removes the file.
    #[instrument(skip(self, audio), fields(audio_size = audio.len(), format = %format))]
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        format: AudioFormat,
    ) -> Result<TranscriptionResult, ApplicationError> {
        if audio.is_empty() {
            return Err(ApplicationError::transcription(
                FailureKind::Input,
                "audio upload is empty",
            ));
        }

        let upload = self.media.stage_upload(audio, format).await?;

        let result = self.transcriber.transcribe_file(upload.path(), format).await;
        let discarded = self.media.discard_upload(upload).await;

        let transcription = match (result, discarded) {
            (Ok(transcription), Ok(())) => transcription,
            (Ok(_), Err(e)) => return Err(e),
            (Err(e), Ok(())) => return Err(e),
            (Err(e), Err(discard_err)) => {
                warn!(error = %discard_err, "Failed to discard staged upload");
                return Err(e);
            },
        };

        if transcription.text.trim().is_empty() {
            return Err(ApplicationError::transcription(
                FailureKind::Input,
                "no speech was recognized in the audio",
            ));
        }

        debug!(
            chars = transcription.text.chars().count(),
            language = ?transcription.detected_language,
            "Transcription complete"
        );

        Ok(transcription)
    }

    /// Ask the tutor for a reply to `message`
    ///
    /// The prompt is the persona, then the (windowed) history in order, then
    /// the message. The dialogue port is called exactly once.
    #[instrument(skip(self, message, history), fields(history_len = history.len()))]
    pub async fn reply(
        &self,
        message: &str,
        history: Vec<ChatMessage>,
    ) -> Result<String, ApplicationError> {
        let turn = ConversationTurn::new(message, history)
            .map_err(|e| ApplicationError::dialogue(FailureKind::Input, e.to_string()))?
            .with_window(self.config.history_window);

        debug!(kept_history = turn.history().len(), "Prompt assembled");

        let reply = self.dialogue.reply(turn.prompt()).await?;
        let reply = reply.trim();

        if reply.is_empty() {
            return Err(ApplicationError::dialogue(
                FailureKind::Upstream,
                "dialogue backend returned no reply text",
            ));
        }

        Ok(reply.to_string())
    }

    /// Speak `text` and store it as an artifact
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn synthesize(&self, text: &str) -> Result<ArtifactId, ApplicationError> {
        if text.trim().is_empty() {
            return Err(ApplicationError::synthesis(
                FailureKind::Input,
                "text to synthesize is empty",
            ));
        }

        let audio = self.synthesizer.synthesize(text.to_string()).await?;
        if audio.data.is_empty() {
            return Err(ApplicationError::synthesis(
                FailureKind::Upstream,
                "synthesis engine returned no audio",
            ));
        }

        let artifact = self.media.store_artifact(audio.data, audio.format).await?;

        debug!(
            artifact_id = %artifact.id,
            size_bytes = artifact.size_bytes,
            expires_at = %artifact.expires_at,
            "Artifact stored"
        );

        Ok(artifact.id)
    }

    /// Fetch a previously issued artifact
    ///
    /// Anything that is not a live artifact id is reported as not found.
    /// With `reclaim_on_fetch` the artifact is served at most once, even to
    /// concurrent callers.
    #[instrument(skip(self))]
    pub async fn fetch_artifact(&self, id: &str) -> Result<ArtifactContent, ApplicationError> {
        let artifact_id = ArtifactId::parse(id)
            .map_err(|_| ApplicationError::ArtifactNotFound("malformed artifact id".to_string()))?;

        let content = if self.config.reclaim_on_fetch {
            self.media.take_artifact(artifact_id).await?
        } else {
            self.media.read_artifact(artifact_id).await?
        };

        let mut tracker = TurnTracker::resume(TurnState::Ready);
        advance(&mut tracker, TurnState::Served)?;
        debug!(%artifact_id, reclaimed = self.config.reclaim_on_fetch, "Artifact served");

        Ok(content)
    }

    /// Run a text chat turn: dialogue, then synthesis
    #[instrument(skip(self, message, history))]
    pub async fn chat(
        &self,
        message: &str,
        history: Vec<ChatMessage>,
    ) -> Result<ChatOutcome, ApplicationError> {
        let mut tracker = TurnTracker::new();

        advance(&mut tracker, TurnState::AwaitingDialogue)?;
        let response = self.reply(message, history).await.map_err(|e| {
            fail(&mut tracker, &e);
            e
        })?;

        advance(&mut tracker, TurnState::Synthesizing)?;
        let audio = self.synthesize(&response).await.map_err(|e| {
            fail(&mut tracker, &e);
            e
        })?;

        advance(&mut tracker, TurnState::Ready)?;
        info!(artifact_id = %audio, "Chat turn ready");

        Ok(ChatOutcome { response, audio })
    }

    /// Run a full turn from uploaded audio to a spoken reply
    #[instrument(skip(self, audio, history), fields(audio_size = audio.len(), format = %format))]
    pub async fn run_voice_turn(
        &self,
        audio: Vec<u8>,
        format: AudioFormat,
        history: Vec<ChatMessage>,
    ) -> Result<VoiceTurnOutcome, ApplicationError> {
        let mut tracker = TurnTracker::new();

        advance(&mut tracker, TurnState::Transcribing)?;
        let transcription = self.transcribe(audio, format).await.map_err(|e| {
            fail(&mut tracker, &e);
            e
        })?;

        advance(&mut tracker, TurnState::AwaitingDialogue)?;
        let response = self
            .reply(&transcription.text, history)
            .await
            .map_err(|e| {
                fail(&mut tracker, &e);
                e
            })?;

        advance(&mut tracker, TurnState::Synthesizing)?;
        let audio = self.synthesize(&response).await.map_err(|e| {
            fail(&mut tracker, &e);
            e
        })?;

        advance(&mut tracker, TurnState::Ready)?;
        info!(artifact_id = %audio, "Voice turn ready");

        Ok(VoiceTurnOutcome {
            transcription: transcription.text,
            response,
            audio,
            states: tracker.visited().to_vec(),
        })
    }

    /// Reclaim every artifact whose TTL has elapsed at `now`
    #[instrument(skip(self))]
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, ApplicationError> {
        let removed = self.media.purge_expired(now).await?;
        if removed > 0 {
            info!(
                removed,
                state = %TurnState::Expired,
                "Expired artifacts reclaimed"
            );
        }
        Ok(removed)
    }

    /// Number of artifacts waiting to be fetched or expire
    pub fn live_artifacts(&self) -> usize {
        self.media.live_artifacts()
    }

    /// Whether the dialogue backend can serve requests
    pub async fn is_ready(&self) -> bool {
        self.dialogue.is_healthy().await
    }

    /// Name of the model answering as the tutor
    pub fn dialogue_model(&self) -> String {
        self.dialogue.current_model()
    }
}

fn advance(tracker: &mut TurnTracker, next: TurnState) -> Result<(), ApplicationError> {
    let from = tracker.state();
    tracker
        .advance(next)
        .map_err(|e| ApplicationError::Internal(e.to_string()))?;
    debug!(from = %from, to = %next, "Turn state changed");
    Ok(())
}

fn fail(tracker: &mut TurnTracker, error: &ApplicationError) {
    let from = tracker.state();
    if tracker.fail().is_ok() {
        warn!(from = %from, error = %error, "Turn failed");
    }
}
