use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventImages::EventId).integer().not_null())
                    .col(ColumnDef::new(EventImages::File).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_images_event_id")
                            .from(EventImages::Table, EventImages::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_images_event_id")
                    .table(EventImages::Table)
                    .col(EventImages::EventId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventImages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EventImages {
    Table,
    Id,
    EventId,
    File,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
}
