//! Migration to create the leads table backing the sales funnel.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Leads::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Leads::CompanyId).uuid().null())
                    .col(ColumnDef::new(Leads::UserId).uuid().null())
                    .col(ColumnDef::new(Leads::Name).string().not_null())
                    .col(ColumnDef::new(Leads::Segment).string().not_null())
                    .col(ColumnDef::new(Leads::ProspectType).string().not_null())
                    .col(ColumnDef::new(Leads::City).string().not_null())
                    .col(ColumnDef::new(Leads::State).string().not_null())
                    .col(ColumnDef::new(Leads::Phone).string().null())
                    .col(ColumnDef::new(Leads::Instagram).string().null())
                    .col(ColumnDef::new(Leads::Site).string().null())
                    .col(ColumnDef::new(Leads::RecommendedSubstrate).string().not_null())
                    .col(ColumnDef::new(Leads::ProductsUsed).string().not_null())
                    .col(ColumnDef::new(Leads::EstimatedVolume).string().not_null())
                    .col(ColumnDef::new(Leads::PurchaseFrequency).string().not_null())
                    .col(ColumnDef::new(Leads::Status).string().not_null())
                    .col(ColumnDef::new(Leads::Notes).text().not_null())
                    .col(ColumnDef::new(Leads::History).json_binary().not_null())
                    .col(
                        ColumnDef::new(Leads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Leads::Potential).string().not_null())
                    .col(
                        ColumnDef::new(Leads::LastInteraction)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Leads::Cnpj).string().null())
                    .col(ColumnDef::new(Leads::Niche).string().null())
                    .col(
                        ColumnDef::new(Leads::Priority)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Leads::LegalName).string().null())
                    .col(ColumnDef::new(Leads::TradeName).string().null())
                    .col(ColumnDef::new(Leads::Address).string().null())
                    .col(ColumnDef::new(Leads::Cnae).string().null())
                    .col(ColumnDef::new(Leads::RegistrationStatus).string().null())
                    .col(ColumnDef::new(Leads::DigitalPresence).string().null())
                    .col(ColumnDef::new(Leads::Whatsapp).string().null())
                    .col(ColumnDef::new(Leads::CommercialEmail).string().null())
                    .col(ColumnDef::new(Leads::ContactPerson).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leads_company_status")
                    .table(Leads::Table)
                    .col(Leads::CompanyId)
                    .col(Leads::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Leads::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
    CompanyId,
    UserId,
    Name,
    Segment,
    ProspectType,
    City,
    State,
    Phone,
    Instagram,
    Site,
    RecommendedSubstrate,
    ProductsUsed,
    EstimatedVolume,
    PurchaseFrequency,
    Status,
    Notes,
    History,
    CreatedAt,
    Potential,
    LastInteraction,
    Cnpj,
    Niche,
    Priority,
    LegalName,
    TradeName,
    Address,
    Cnae,
    RegistrationStatus,
    DigitalPresence,
    Whatsapp,
    CommercialEmail,
    ContactPerson,
}
