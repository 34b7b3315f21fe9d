//! An open newsletter: current blocks, undo history and the confidentiality scanner.
//!
//! Every change to the block collection goes through [`EditingSession::commit`],
//! which records one history entry and schedules a scan. Undo and redo load a
//! snapshot without recording.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::approval::{transition, validate_recipient, ApprovalNotifier};
use crate::assistant::{chat_request, ChatAssistant, ChatReply, ColspanSuggestion, Replacement};
use crate::editing::{apply, Direction, DropPosition, Edit, History, TableOp};
use crate::errors::AppError;
use crate::generation::{generate_from_sources, BlockGenerator};
use crate::layout::{assign_layout, LayoutSuggester};
use crate::models::{
    create_block, ApprovalStatus, BlockPatch, BlockType, Colspan, ContentBlock, Newsletter, Source,
    SourceDescriptor,
};
use crate::scanner::{resolve_issues, FlaggedIssue, ScanOutcome, ScanScheduler};
use crate::store::NewsletterStore;

pub struct EditingSession {
    newsletter: Newsletter,
    history: History,
    scanner: Option<Arc<ScanScheduler>>,
}

impl EditingSession {
    pub fn new(newsletter: Newsletter) -> Self {
        let history = History::with_initial(newsletter.blocks.clone());
        Self {
            newsletter,
            history,
            scanner: None,
        }
    }

    pub async fn open(store: &dyn NewsletterStore, id: &str) -> Result<Self, AppError> {
        let newsletter = store.get(id).await?;
        info!(
            "Opened newsletter {} ({} blocks)",
            newsletter.id,
            newsletter.blocks.len()
        );
        Ok(Self::new(newsletter))
    }

    /// Attaches a scanner and schedules a scan of the current blocks.
    /// Must be called inside a tokio runtime.
    pub fn with_scanner(mut self, scanner: Arc<ScanScheduler>) -> Self {
        scanner.schedule(self.newsletter.blocks.clone());
        self.scanner = Some(scanner);
        self
    }

    pub fn newsletter(&self) -> &Newsletter {
        &self.newsletter
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.newsletter.blocks
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub async fn save(&mut self, store: &dyn NewsletterStore) -> Result<(), AppError> {
        self.newsletter.touch();
        store.put(&self.newsletter).await?;
        debug!("Saved newsletter {}", self.newsletter.id);
        Ok(())
    }

    /// Removes the newsletter from `store` and drops any pending scan.
    pub async fn delete(self, store: &dyn NewsletterStore) -> Result<(), AppError> {
        if let Some(scanner) = &self.scanner {
            scanner.cancel_pending();
        }
        store.delete(&self.newsletter.id).await?;
        info!("Deleted newsletter {}", self.newsletter.id);
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Structural edits
    // ────────────────────────────────────────────────────────────────────────

    /// Applies `edit`. Returns `false` when it changed nothing; no history is recorded then.
    pub fn apply(&mut self, edit: Edit) -> Result<bool, AppError> {
        match apply(&self.newsletter.blocks, &edit)? {
            Some(next) => {
                self.commit(next);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Inserts a new block of `block_type` with editor defaults and returns its id.
    pub fn insert_block(
        &mut self,
        block_type: BlockType,
        at: Option<usize>,
    ) -> Result<String, AppError> {
        let block = create_block(block_type, BlockPatch::default());
        let id = block.id().to_string();
        self.apply(Edit::Insert { block, at })?;
        Ok(id)
    }

    pub fn update_block(&mut self, id: &str, patch: BlockPatch) -> Result<bool, AppError> {
        self.apply(Edit::Update {
            id: id.to_string(),
            patch,
        })
    }

    pub fn delete_block(&mut self, id: &str) -> Result<bool, AppError> {
        self.apply(Edit::Delete { id: id.to_string() })
    }

    pub fn move_block(&mut self, id: &str, direction: Direction) -> Result<bool, AppError> {
        self.apply(Edit::Move {
            id: id.to_string(),
            direction,
        })
    }

    pub fn reorder(
        &mut self,
        id: &str,
        target_id: &str,
        position: DropPosition,
    ) -> Result<bool, AppError> {
        self.apply(Edit::Reorder {
            id: id.to_string(),
            target_id: target_id.to_string(),
            position,
        })
    }

    pub fn edit_table(&mut self, id: &str, op: TableOp) -> Result<bool, AppError> {
        self.apply(Edit::Table {
            id: id.to_string(),
            op,
        })
    }

    fn commit(&mut self, blocks: Vec<ContentBlock>) {
        self.history.record(blocks.clone());
        self.newsletter.blocks = blocks;
        self.schedule_scan();
    }

    fn schedule_scan(&self) {
        if let Some(scanner) = &self.scanner {
            scanner.schedule(self.newsletter.blocks.clone());
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // History
    // ────────────────────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.newsletter.blocks = snapshot.clone();
        self.schedule_scan();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.newsletter.blocks = snapshot.clone();
        self.schedule_scan();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Assisted edits
    // ────────────────────────────────────────────────────────────────────────

    /// Replaces the collection with the suggested layout. On failure the
    /// collection is left as it was.
    pub async fn suggest_layout(&mut self, suggester: &dyn LayoutSuggester) -> Result<bool, AppError> {
        let next = assign_layout(&self.newsletter.blocks, suggester).await?;
        if next == self.newsletter.blocks {
            return Ok(false);
        }
        self.commit(next);
        Ok(true)
    }

    /// Inserts generated blocks before the footer as one history entry.
    pub fn add_generated_blocks(&mut self, blocks: Vec<ContentBlock>) -> Result<bool, AppError> {
        self.apply(Edit::InsertBeforeFooter(blocks))
    }

    /// Generates blocks from `source`, inserts them before the footer and
    /// remembers the source. Returns how many blocks were added.
    pub async fn add_source(
        &mut self,
        source: Source,
        generator: &dyn BlockGenerator,
    ) -> Result<usize, AppError> {
        let blocks = generate_from_sources(std::slice::from_ref(&source), generator).await?;
        let added = blocks.len();
        self.add_generated_blocks(blocks)?;
        self.newsletter.sources.push(SourceDescriptor::from(&source));
        info!("Added source '{}' with {added} block(s)", source.name);
        Ok(added)
    }

    /// Asks the assistant about the current blocks. Nothing is applied.
    pub async fn ask(
        &self,
        assistant: &dyn ChatAssistant,
        prompt: &str,
    ) -> Result<ChatReply, AppError> {
        assistant
            .chat(&chat_request(prompt, &self.newsletter.blocks))
            .await
    }

    /// Applies an accepted content rewrite through `update`.
    pub fn accept_replacement(&mut self, replacement: &Replacement) -> Result<bool, AppError> {
        self.update_block(
            &replacement.block_id,
            BlockPatch::content(replacement.new_content.clone()),
        )
    }

    /// Applies accepted colspans by block id as one history entry. Unknown ids are ignored.
    pub fn accept_layout_suggestion(
        &mut self,
        suggestion: &[ColspanSuggestion],
    ) -> Result<bool, AppError> {
        let wanted: HashMap<&str, Colspan> = suggestion
            .iter()
            .map(|s| (s.block_id.as_str(), s.colspan))
            .collect();

        let next: Vec<ContentBlock> = self
            .newsletter
            .blocks
            .iter()
            .cloned()
            .map(|mut b| {
                if let Some(colspan) = wanted.get(b.id()) {
                    b.colspan = *colspan;
                }
                b
            })
            .collect();

        if next == self.newsletter.blocks {
            return Ok(false);
        }
        self.commit(next);
        Ok(true)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Approval
    // ────────────────────────────────────────────────────────────────────────

    pub fn status(&self) -> ApprovalStatus {
        self.newsletter.status
    }

    pub fn set_status(&mut self, status: ApprovalStatus) -> Result<(), AppError> {
        self.newsletter.status = transition(self.newsletter.status, status)?;
        info!(
            "Newsletter {} is now {}",
            self.newsletter.id,
            status.as_str()
        );
        Ok(())
    }

    /// Moves the newsletter to review and notifies `recipient`. The status only
    /// changes once the notification is delivered.
    pub async fn submit_for_approval(
        &mut self,
        notifier: &dyn ApprovalNotifier,
        recipient: &str,
    ) -> Result<(), AppError> {
        let recipient = validate_recipient(recipient)?;
        let next = transition(self.newsletter.status, ApprovalStatus::PendingApproval)?;
        notifier.request_approval(recipient, &self.newsletter).await?;
        self.newsletter.status = next;
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Confidentiality
    // ────────────────────────────────────────────────────────────────────────

    pub fn scan_outcome(&self) -> Option<ScanOutcome> {
        self.scanner.as_ref().and_then(|s| s.latest())
    }

    /// Issues from the latest scan, joined to the blocks as they are now.
    pub fn flagged_issues(&self) -> Vec<FlaggedIssue> {
        self.scan_outcome()
            .map(|o| resolve_issues(o.flagged_items(), &self.newsletter.blocks))
            .unwrap_or_default()
    }

    pub fn is_confidential(&self) -> bool {
        self.scan_outcome().is_some_and(|o| o.is_confidential())
    }

    /// Error text of the latest scan, if it failed.
    pub fn scan_error(&self) -> Option<String> {
        match self.scan_outcome()? {
            ScanOutcome::Failed(message) => Some(message),
            ScanOutcome::Completed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::approval::LogNotifier;
    use crate::generation::{GenerateBlocksRequest, GenerateBlocksResponse, GeneratedBlock, GeneratedKind};
    use crate::layout::{LayoutBlock, LayoutRequest, LayoutResponse};
    use crate::models::SourceKind;
    use crate::scanner::{default_sensitive_keywords, KeywordClassifier};
    use crate::store::MemoryStore;

    fn session() -> EditingSession {
        EditingSession::new(Newsletter::skeleton(
            "Weekly",
            &[],
            vec![
                create_block(BlockType::Text, BlockPatch::content("Intro")),
                create_block(BlockType::Text, BlockPatch::content("Body")),
            ],
        ))
    }

    fn contents(session: &EditingSession) -> Vec<String> {
        session.blocks().iter().map(|b| b.content.clone()).collect()
    }

    struct FixedSuggester(Result<Vec<LayoutBlock>, String>);

    #[async_trait]
    impl LayoutSuggester for FixedSuggester {
        async fn suggest_layout(&self, _: &LayoutRequest) -> Result<LayoutResponse, AppError> {
            self.0
                .clone()
                .map(|layout| LayoutResponse { layout })
                .map_err(AppError::Llm)
        }
    }

    struct OneBlockGenerator(Result<(), String>);

    #[async_trait]
    impl BlockGenerator for OneBlockGenerator {
        async fn generate_blocks(
            &self,
            _: &GenerateBlocksRequest,
        ) -> Result<GenerateBlocksResponse, AppError> {
            self.0.clone().map_err(AppError::Llm)?;
            Ok(GenerateBlocksResponse {
                blocks: vec![GeneratedBlock {
                    title: Some("From source".to_string()),
                    content: "Generated".to_string(),
                    kind: GeneratedKind::Text,
                }],
            })
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl ApprovalNotifier for FailingNotifier {
        async fn request_approval(&self, _: &str, _: &Newsletter) -> Result<(), AppError> {
            Err(AppError::ServiceUnavailable("mail down".to_string()))
        }
    }

    fn note_source() -> Source {
        Source {
            name: "notes.txt".to_string(),
            kind: SourceKind::Text,
            content: "raw".to_string(),
        }
    }

    #[test]
    fn test_edit_then_undo_restores_and_redo_reapplies() {
        let mut s = session();
        let before = s.blocks().to_vec();
        let id = s.blocks()[1].id().to_string();

        assert!(s.update_block(&id, BlockPatch::content("Edited")).unwrap());
        let after = s.blocks().to_vec();

        assert!(s.undo());
        assert_eq!(s.blocks(), before.as_slice());
        assert!(s.redo());
        assert_eq!(s.blocks(), after.as_slice());
        assert!(!s.redo());
    }

    #[test]
    fn test_new_edit_after_undo_drops_redo() {
        let mut s = session();
        let id = s.blocks()[1].id().to_string();
        s.delete_block(&id).unwrap();
        s.undo();
        assert!(s.can_redo());

        s.insert_block(BlockType::Spacer, Some(1)).unwrap();
        assert!(!s.can_redo());
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn test_noop_edits_do_not_record_history() {
        let mut s = session();
        let header = s.blocks()[0].id().to_string();
        assert!(!s.move_block(&header, Direction::Up).unwrap());
        assert!(!s.delete_block("missing").unwrap());
        assert!(!s.can_undo());
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_undo_on_fresh_session_is_noop() {
        let mut s = session();
        assert!(!s.undo());
        assert!(!s.can_undo());
        assert_eq!(s.history().index(), 0);
    }

    #[test]
    fn test_invalid_table_edit_leaves_session_untouched() {
        let mut s = session();
        let table = s.insert_block(BlockType::Table, None).unwrap();
        let len = s.history().len();

        let err = s.edit_table(&table, TableOp::RemoveRow(0)).unwrap_err();
        assert!(matches!(err, AppError::InvalidTableMutation(_)));
        assert_eq!(s.history().len(), len);
    }

    #[tokio::test]
    async fn test_suggest_layout_failure_keeps_blocks() {
        let mut s = session();
        let before = s.blocks().to_vec();
        assert!(s
            .suggest_layout(&FixedSuggester(Err("boom".to_string())))
            .await
            .is_err());
        assert_eq!(s.blocks(), before.as_slice());
        assert!(!s.can_undo());
    }

    #[tokio::test]
    async fn test_suggest_layout_keeps_anchors_and_is_undoable() {
        let mut s = session();
        let layout = vec![
            LayoutBlock {
                content: "Body".to_string(),
                block_type: BlockType::Text,
                image_url: None,
                video_url: None,
                colspan: 2,
            },
            LayoutBlock {
                content: "Intro".to_string(),
                block_type: BlockType::Text,
                image_url: None,
                video_url: None,
                colspan: 2,
            },
        ];
        assert!(s.suggest_layout(&FixedSuggester(Ok(layout))).await.unwrap());

        let types: Vec<_> = s.blocks().iter().map(|b| b.block_type).collect();
        assert_eq!(types.first(), Some(&BlockType::Header));
        assert_eq!(types.last(), Some(&BlockType::Footer));
        assert_eq!(contents(&s)[1..3], ["Body".to_string(), "Intro".to_string()]);

        assert!(s.undo());
        assert_eq!(contents(&s)[1], "Intro");
    }

    #[tokio::test]
    async fn test_add_source_inserts_before_footer() {
        let mut s = session();
        let added = s
            .add_source(note_source(), &OneBlockGenerator(Ok(())))
            .await
            .unwrap();

        assert_eq!(added, 1);
        let n = s.blocks().len();
        assert_eq!(s.blocks()[n - 2].content, "Generated");
        assert_eq!(s.blocks()[n - 1].block_type, BlockType::Footer);
        assert_eq!(s.newsletter().sources.len(), 1);
        assert_eq!(s.history().len(), 2);
    }

    #[tokio::test]
    async fn test_add_source_failure_changes_nothing() {
        let mut s = session();
        let before = s.blocks().to_vec();
        assert!(s
            .add_source(note_source(), &OneBlockGenerator(Err("down".to_string())))
            .await
            .is_err());
        assert_eq!(s.blocks(), before.as_slice());
        assert!(s.newsletter().sources.is_empty());
    }

    #[test]
    fn test_accept_replacement_updates_content() {
        let mut s = session();
        let id = s.blocks()[1].id().to_string();
        let replacement = Replacement {
            block_id: id.clone(),
            new_content: "Punchier intro".to_string(),
        };
        assert!(s.accept_replacement(&replacement).unwrap());
        assert_eq!(s.newsletter().block(&id).unwrap().content, "Punchier intro");
    }

    #[test]
    fn test_accept_layout_suggestion_is_one_entry_and_ignores_unknown() {
        let mut s = session();
        let a = s.blocks()[1].id().to_string();
        let b = s.blocks()[2].id().to_string();
        let suggestion = vec![
            ColspanSuggestion {
                block_id: a.clone(),
                colspan: Colspan::Half,
            },
            ColspanSuggestion {
                block_id: b.clone(),
                colspan: Colspan::Half,
            },
            ColspanSuggestion {
                block_id: "ghost".to_string(),
                colspan: Colspan::Full,
            },
        ];
        assert!(s.accept_layout_suggestion(&suggestion).unwrap());
        assert_eq!(s.newsletter().block(&a).unwrap().colspan, Colspan::Half);
        assert_eq!(s.newsletter().block(&b).unwrap().colspan, Colspan::Half);
        assert_eq!(s.history().len(), 2);

        assert!(!s.accept_layout_suggestion(&suggestion).unwrap());
    }

    #[tokio::test]
    async fn test_submit_for_approval() {
        let mut s = session();
        s.submit_for_approval(&LogNotifier, "lead@example.com")
            .await
            .unwrap();
        assert_eq!(s.status(), ApprovalStatus::PendingApproval);

        s.set_status(ApprovalStatus::Approved).unwrap();
        assert!(s.set_status(ApprovalStatus::Rejected).is_err());
        assert_eq!(s.status(), ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn test_failed_notification_keeps_draft() {
        let mut s = session();
        assert!(s
            .submit_for_approval(&FailingNotifier, "lead@example.com")
            .await
            .is_err());
        assert_eq!(s.status(), ApprovalStatus::Draft);
    }

    #[tokio::test]
    async fn test_save_open_delete_through_store() {
        let store = MemoryStore::new();
        let mut s = session();
        let id = s.newsletter().id.clone();
        let block_id = s.blocks()[1].id().to_string();
        s.update_block(&block_id, BlockPatch::content("Saved")).unwrap();
        s.save(&store).await.unwrap();

        let reopened = EditingSession::open(&store, &id).await.unwrap();
        assert_eq!(reopened.blocks()[1].content, "Saved");
        assert!(!reopened.can_undo());

        reopened.delete(&store).await.unwrap();
        assert!(matches!(
            EditingSession::open(&store, &id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_follows_edits_and_resolves_against_live_blocks() {
        let scanner = Arc::new(ScanScheduler::new(
            Arc::new(KeywordClassifier),
            default_sensitive_keywords(),
            Duration::from_millis(500),
        ));
        let mut rx = scanner.subscribe();
        let mut s = session().with_scanner(scanner);
        let id = s.blocks()[1].id().to_string();

        s.update_block(
            &id,
            BlockPatch {
                title: Some("Plans".to_string()),
                ..BlockPatch::content("This is confidential. Still confidential.")
            },
        )
        .unwrap();
        rx.changed().await.unwrap();

        assert!(s.is_confidential());
        let issues = s.flagged_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].block_title.as_deref(), Some("Plans"));

        // the issue outlives its block until the next scan lands
        s.delete_block(&id).unwrap();
        assert_eq!(s.flagged_issues()[0].block_title, None);

        rx.changed().await.unwrap();
        assert!(s.flagged_issues().is_empty());
        assert!(s.scan_error().is_none());
    }
}
