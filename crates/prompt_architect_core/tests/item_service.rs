use prompt_architect_core::generation::GenerationOperation;
use prompt_architect_core::{
    initial_items, merge_tags_on_distill, Distillation, GeneratedPrompt, GenerationError,
    GenerationProvider, GenerationResult, Item, ItemKind, ItemQuery, ItemService,
    ItemServiceError, KindFilter, MemoryItemRepository, MockGenerationProvider,
};

const NOW: i64 = 1_700_000_000_000;

fn fixed_clock() -> i64 {
    NOW
}

fn seeded_service() -> ItemService<MemoryItemRepository> {
    let mut service = ItemService::with_clock(MemoryItemRepository::new(), fixed_clock);
    service.seed(initial_items().unwrap()).unwrap();
    service
}

fn first_of_kind(service: &ItemService<MemoryItemRepository>, kind: ItemKind) -> Item {
    service
        .items()
        .iter()
        .find(|item| item.kind() == kind)
        .cloned()
        .unwrap()
}

/// Provider whose every call fails like an unreachable remote API.
struct FailingProvider;

impl GenerationProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn compose_from_idea(&self, _idea: &str) -> GenerationResult<Vec<GeneratedPrompt>> {
        Err(GenerationError::Status {
            operation: GenerationOperation::Compose,
            status: 503,
        })
    }

    fn distill_bookmark(&self, _url: &str) -> GenerationResult<Distillation> {
        Err(GenerationError::InvalidResponse {
            operation: GenerationOperation::Distill,
        })
    }

    fn refine_prompt(&self, _body: &str, _framework: &str) -> GenerationResult<String> {
        Err(GenerationError::Request {
            operation: GenerationOperation::Refine,
            message: "connection refused".to_string(),
        })
    }

    fn suggest_variable_values(
        &self,
        _body: &str,
        _variable_name: &str,
    ) -> GenerationResult<Vec<String>> {
        Err(GenerationError::Status {
            operation: GenerationOperation::Suggest,
            status: 429,
        })
    }
}

#[test]
fn compose_prepends_prompts_with_composer_source() {
    let mut service = seeded_service();
    let created = service
        .compose_from_idea(&MockGenerationProvider::new(), "home coffee roasting")
        .unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(service.items().len(), 6);
    assert_eq!(service.items()[0], created[0]);
    assert_eq!(service.items()[1], created[1]);

    let first = &created[0];
    assert_eq!(first.kind(), ItemKind::Prompt);
    assert!(first.title().starts_with("Mock:"));
    assert_eq!(first.variables(), ["platform".to_string()]);
    assert_eq!(first.created_at(), NOW);
    let source = first.source().unwrap();
    assert_eq!(source.get("type").map(String::as_str), Some("composer"));
    assert_eq!(
        source.get("idea").map(String::as_str),
        Some("home coffee roasting")
    );
}

#[test]
fn compose_rejects_blank_idea_without_calling_provider() {
    let mut service = seeded_service();
    let err = service
        .compose_from_idea(&FailingProvider, "   ")
        .unwrap_err();
    assert_eq!(err, ItemServiceError::EmptyIdea);
}

#[test]
fn distill_updates_bookmark_and_orders_prompts_first() {
    let mut service = seeded_service();
    let bookmark = first_of_kind(&service, ItemKind::Bookmark);

    let outcome = service
        .distill_bookmark(&MockGenerationProvider::new(), bookmark.id())
        .unwrap();

    assert!(outcome.bookmark.body().unwrap().starts_with("Mock:"));
    assert!(outcome.bookmark.tags().contains("ai"));
    assert!(outcome.bookmark.tags().contains("distilled"));
    assert_eq!(outcome.bookmark.updated_at(), NOW);
    assert_eq!(outcome.bookmark.created_at(), bookmark.created_at());

    let items = service.items();
    let prompt_count = outcome.prompts.len();
    assert_eq!(items.len(), 4 + prompt_count);
    assert_eq!(&items[..prompt_count], outcome.prompts.as_slice());
    assert_eq!(items[prompt_count].id(), bookmark.id());
    for prompt in &outcome.prompts {
        let source = prompt.source().unwrap();
        assert_eq!(
            source.get("type").map(String::as_str),
            Some("bookmark-distill")
        );
        assert_eq!(source.get("url").map(String::as_str), bookmark.url());
    }
}

#[test]
fn distill_unions_page_tags_into_bookmark_tags() {
    let mut service = seeded_service();
    let bookmark = first_of_kind(&service, ItemKind::Bookmark);
    let before = bookmark.tags().clone();
    let existing = before.iter().next().cloned().unwrap();
    let page_tags = vec![existing, "rust".to_string(), " ".to_string()];

    let outcome = service
        .apply_distillation(
            bookmark.id(),
            Distillation {
                summary: "Summary".to_string(),
                prompts: Vec::new(),
                tags: page_tags,
            },
        )
        .unwrap();

    let expected = merge_tags_on_distill(&before, ["rust"]);
    assert_eq!(outcome.bookmark.tags(), &expected);
    assert_eq!(outcome.bookmark.tags().len(), before.len() + 1);
    assert!(before.is_subset(outcome.bookmark.tags()));
    assert_eq!(service.get_item(bookmark.id()).unwrap().tags(), &expected);
}

#[test]
fn distill_requires_a_bookmark() {
    let mut service = seeded_service();
    let note = first_of_kind(&service, ItemKind::Note);
    let err = service
        .distill_bookmark(&MockGenerationProvider::new(), note.id())
        .unwrap_err();
    assert_eq!(
        err,
        ItemServiceError::WrongKind {
            id: note.id(),
            expected: ItemKind::Bookmark,
            actual: ItemKind::Note,
        }
    );
}

#[test]
fn refine_keeps_id_and_position() {
    let mut service = seeded_service();
    let prompt = first_of_kind(&service, ItemKind::Prompt);
    let position = service
        .items()
        .iter()
        .position(|item| item.id() == prompt.id())
        .unwrap();

    let refined = service
        .refine_prompt(&MockGenerationProvider::new(), prompt.id(), "Make it more concise")
        .unwrap();

    assert_eq!(refined.id(), prompt.id());
    assert_eq!(service.items()[position].id(), prompt.id());
    assert!(refined
        .body()
        .unwrap()
        .ends_with("*Mock Refinement Applied: Make it more concise*"));
    assert_eq!(refined.variables(), prompt.variables());
    assert_eq!(refined.updated_at(), NOW);
}

#[test]
fn failed_generation_leaves_collection_unchanged() {
    let mut service = seeded_service();
    let before = service.items().to_vec();
    let bookmark = first_of_kind(&service, ItemKind::Bookmark);
    let prompt = first_of_kind(&service, ItemKind::Prompt);

    let err = service
        .compose_from_idea(&FailingProvider, "idea")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to generate prompts: generation API returned status 503"
    );
    assert!(matches!(
        service.distill_bookmark(&FailingProvider, bookmark.id()),
        Err(ItemServiceError::Generation(GenerationError::InvalidResponse { .. }))
    ));
    assert!(service
        .refine_prompt(&FailingProvider, prompt.id(), "Okay/Better/Best")
        .is_err());
    assert!(service
        .suggest_variable_values(&FailingProvider, prompt.id(), "topic")
        .is_err());

    assert_eq!(service.items(), before.as_slice());
}

#[test]
fn suggest_requires_a_referenced_variable() {
    let service = seeded_service();
    let prompt = first_of_kind(&service, ItemKind::Prompt);

    let values = service
        .suggest_variable_values(&MockGenerationProvider::new(), prompt.id(), "topic")
        .unwrap();
    assert_eq!(values.len(), 3);
    assert!(values.iter().all(|value| value.starts_with("Mock suggestion")));

    let err = service
        .suggest_variable_values(&MockGenerationProvider::new(), prompt.id(), "missing")
        .unwrap_err();
    assert!(matches!(err, ItemServiceError::UnknownVariable { .. }));
}

#[test]
fn edits_go_through_the_service_clock() {
    let mut service = seeded_service();
    let prompt = first_of_kind(&service, ItemKind::Prompt);

    let updated = service.update_body(prompt.id(), "Only {{one}}").unwrap();
    assert_eq!(updated.variables(), ["one".to_string()]);
    assert_eq!(updated.updated_at(), NOW);

    let tagged = service
        .set_tags(prompt.id(), vec!["fresh".to_string()])
        .unwrap();
    assert_eq!(service.all_tags().iter().filter(|t| *t == "fresh").count(), 1);
    assert_eq!(tagged.tags().len(), 1);

    let missing = uuid::Uuid::new_v4();
    assert_eq!(
        service.update_title(missing, "x").unwrap_err(),
        ItemServiceError::ItemNotFound(missing)
    );
}

#[test]
fn query_reads_the_live_collection() {
    let mut service = seeded_service();
    let query = ItemQuery::new().kind(KindFilter::Only(ItemKind::Prompt));
    assert_eq!(service.query(&query).count, 2);

    service
        .compose_from_idea(&MockGenerationProvider::new(), "idea")
        .unwrap();
    assert_eq!(service.query(&query).count, 4);
}
