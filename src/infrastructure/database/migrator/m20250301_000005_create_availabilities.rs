//! Create availabilities table

use sea_orm_migration::prelude::*;

use super::m20250301_000002_create_doctors::Doctors;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Availabilities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Availabilities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Availabilities::DoctorId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Availabilities::Date).date().not_null())
                    .col(ColumnDef::new(Availabilities::StartTime).time().not_null())
                    .col(ColumnDef::new(Availabilities::EndTime).time().not_null())
                    .col(
                        ColumnDef::new(Availabilities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_availabilities_doctor")
                            .from(Availabilities::Table, Availabilities::DoctorId)
                            .to(Doctors::Table, Doctors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_availabilities_doctor_date")
                    .table(Availabilities::Table)
                    .col(Availabilities::DoctorId)
                    .col(Availabilities::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Availabilities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Availabilities {
    Table,
    Id,
    DoctorId,
    Date,
    StartTime,
    EndTime,
    CreatedAt,
}
