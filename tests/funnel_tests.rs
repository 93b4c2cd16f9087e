//! Sales funnel tests against an in-memory database.

mod test_utils;

use leadshunter::assistant::PotentialLead;
use leadshunter::funnel::{FunnelError, FunnelService, LeadOwner, LeadScope, LeadUpdate, ManualLead};
use leadshunter::models::lead::{FunnelStatus, Level, ProspectType};
use test_utils::setup_test_db;
use uuid::Uuid;

fn prospect(name: &str) -> PotentialLead {
    PotentialLead {
        name: name.to_string(),
        segment: "Padaria".to_string(),
        city: String::new(),
        state: String::new(),
        phone: Some("(41) 3333-4444".to_string()),
        instagram: Some("@padariacentral".to_string()),
        site: None,
        recommended_substrate: "BOPP perolado".to_string(),
        products_used: "Etiquetas de validade".to_string(),
        estimated_volume: Level::High,
        purchase_frequency: Level::Medium,
    }
}

fn owner(company_id: Uuid) -> LeadOwner {
    LeadOwner {
        company_id: Some(company_id),
        user_id: Some(Uuid::new_v4()),
    }
}

#[tokio::test]
async fn prospect_becomes_new_lead_with_search_location() {
    let db = setup_test_db().await.unwrap();
    let funnel = FunnelService::new(db);
    let company_id = Uuid::new_v4();

    let lead = funnel
        .add_prospect(
            prospect("Padaria Central"),
            ProspectType::Commercial,
            "Curitiba",
            "PR",
            owner(company_id),
        )
        .await
        .unwrap();

    assert_eq!(lead.status, FunnelStatus::New);
    assert_eq!(lead.city, "Curitiba");
    assert_eq!(lead.state, "PR");
    assert_eq!(lead.company_id, Some(company_id));
    assert_eq!(lead.potential, Level::High);
    assert_eq!(lead.trade_name.as_deref(), Some("Padaria Central"));
    assert_eq!(lead.registration_status.as_deref(), Some("Ativo"));
    assert!(!lead.priority);
    assert_eq!(lead.history.len(), 1);
    assert!(lead.history[0].starts_with("Prospected at "));
}

#[tokio::test]
async fn search_location_replaces_prospect_location() {
    let db = setup_test_db().await.unwrap();
    let funnel = FunnelService::new(db);

    let mut found = prospect("Padaria Colombo");
    found.city = "Colombo".to_string();
    found.state = "SC".to_string();

    let lead = funnel
        .add_prospect(found, ProspectType::Commercial, "Curitiba", "PR", owner(Uuid::new_v4()))
        .await
        .unwrap();

    assert_eq!(lead.city, "Curitiba");
    assert_eq!(lead.state, "PR");
}

#[tokio::test]
async fn manual_lead_takes_defaults_for_omitted_fields() {
    let db = setup_test_db().await.unwrap();
    let funnel = FunnelService::new(db);

    let lead = funnel
        .add_manual_lead(
            ManualLead {
                name: "Cervejaria Serra".to_string(),
                segment: "Cervejaria".to_string(),
                city: "Gramado".to_string(),
                state: "RS".to_string(),
                priority: true,
                ..Default::default()
            },
            owner(Uuid::new_v4()),
        )
        .await
        .unwrap();

    assert_eq!(lead.prospect_type, ProspectType::Commercial);
    assert_eq!(lead.estimated_volume, Level::Medium);
    assert_eq!(lead.potential, Level::Medium);
    assert_eq!(lead.status, FunnelStatus::New);
    assert_eq!(lead.digital_presence.as_deref(), Some("Não informada"));
    assert!(lead.priority);
    assert!(lead.history[0].starts_with("Lead created manually at "));
}

#[tokio::test]
async fn nameless_leads_are_rejected() {
    let db = setup_test_db().await.unwrap();
    let funnel = FunnelService::new(db);

    let result = funnel
        .add_manual_lead(ManualLead::default(), LeadOwner::default())
        .await;
    assert!(matches!(result, Err(FunnelError::Validation(_))));

    let result = funnel
        .add_prospect(prospect("  "), ProspectType::Industrial, "Joinville", "SC", LeadOwner::default())
        .await;
    assert!(matches!(result, Err(FunnelError::Validation(_))));
}

#[tokio::test]
async fn status_change_prepends_history_and_touches_last_interaction() {
    let db = setup_test_db().await.unwrap();
    let funnel = FunnelService::new(db);
    let company_id = Uuid::new_v4();
    let scope = LeadScope::Company(company_id);

    let lead = funnel
        .add_prospect(prospect("Padaria Central"), ProspectType::Commercial, "Curitiba", "PR", owner(company_id))
        .await
        .unwrap();

    let updated = funnel
        .update_status(lead.id, FunnelStatus::BudgetSent, scope)
        .await
        .unwrap();

    assert_eq!(updated.status, FunnelStatus::BudgetSent);
    assert_eq!(updated.history.len(), 2);
    assert_eq!(updated.history[0], "Status changed to Budget sent");
    assert_eq!(updated.history[1], lead.history[0]);
    assert!(updated.last_interaction >= lead.last_interaction);

    let stored = funnel.get(lead.id, scope).await.unwrap();
    assert_eq!(stored.status, FunnelStatus::BudgetSent);
    assert_eq!(stored.history, updated.history);
}

#[tokio::test]
async fn update_replaces_editable_fields_only() {
    let db = setup_test_db().await.unwrap();
    let funnel = FunnelService::new(db);
    let company_id = Uuid::new_v4();
    let scope = LeadScope::Company(company_id);

    let lead = funnel
        .add_prospect(prospect("Padaria Central"), ProspectType::Commercial, "Curitiba", "PR", owner(company_id))
        .await
        .unwrap();

    let mut update = LeadUpdate::from(lead.clone());
    update.notes = "Pediu amostras de BOPP".to_string();
    update.cnpj = Some("12.345.678/0001-90".to_string());
    update.priority = true;

    let updated = funnel.update_lead(lead.id, update, scope).await.unwrap();

    assert_eq!(updated.id, lead.id);
    assert_eq!(updated.company_id, lead.company_id);
    assert_eq!(updated.user_id, lead.user_id);
    assert_eq!(updated.created_at, lead.created_at);
    assert_eq!(updated.notes, "Pediu amostras de BOPP");
    assert_eq!(updated.cnpj.as_deref(), Some("12.345.678/0001-90"));
    assert!(updated.priority);

    let mut blank = LeadUpdate::from(updated);
    blank.name = String::new();
    assert!(matches!(
        funnel.update_lead(lead.id, blank, scope).await,
        Err(FunnelError::Validation(_))
    ));
}

#[tokio::test]
async fn leads_of_other_companies_read_as_missing() {
    let db = setup_test_db().await.unwrap();
    let funnel = FunnelService::new(db);
    let ours = Uuid::new_v4();
    let theirs = Uuid::new_v4();

    let lead = funnel
        .add_prospect(prospect("Padaria Central"), ProspectType::Commercial, "Curitiba", "PR", owner(theirs))
        .await
        .unwrap();

    assert!(matches!(
        funnel.get(lead.id, LeadScope::Company(ours)).await,
        Err(FunnelError::LeadNotFound(id)) if id == lead.id
    ));
    assert!(matches!(
        funnel
            .update_status(lead.id, FunnelStatus::Closed, LeadScope::Company(ours))
            .await,
        Err(FunnelError::LeadNotFound(_))
    ));
    assert!(funnel.list(LeadScope::Company(ours)).await.unwrap().is_empty());

    assert_eq!(funnel.list(LeadScope::All).await.unwrap().len(), 1);
    assert!(funnel.get(lead.id, LeadScope::All).await.is_ok());
}

#[tokio::test]
async fn board_groups_leads_into_funnel_columns() {
    let db = setup_test_db().await.unwrap();
    let funnel = FunnelService::new(db);
    let company_id = Uuid::new_v4();
    let scope = LeadScope::Company(company_id);

    let mut ids = Vec::new();
    for name in ["Padaria Central", "Cervejaria Serra", "Farmácia Vida"] {
        let lead = funnel
            .add_prospect(prospect(name), ProspectType::Commercial, "Curitiba", "PR", owner(company_id))
            .await
            .unwrap();
        ids.push(lead.id);
    }
    funnel
        .update_status(ids[1], FunnelStatus::Negotiation, scope)
        .await
        .unwrap();
    funnel
        .update_status(ids[2], FunnelStatus::Lost, scope)
        .await
        .unwrap();

    let board = funnel.board(scope).await.unwrap();

    let statuses: Vec<FunnelStatus> = board.columns.iter().map(|c| c.status).collect();
    assert_eq!(statuses, FunnelStatus::COLUMNS.to_vec());
    assert_eq!(board.columns[0].label, "New");

    let count = |status: FunnelStatus| {
        board
            .columns
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.leads.len())
            .unwrap_or_default()
    };
    assert_eq!(count(FunnelStatus::New), 1);
    assert_eq!(count(FunnelStatus::Negotiation), 1);
    assert_eq!(count(FunnelStatus::Lost), 1);
    assert_eq!(count(FunnelStatus::Closed), 0);
}
