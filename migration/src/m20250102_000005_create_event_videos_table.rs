use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventVideos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventVideos::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // one-to-one with events
                    .col(ColumnDef::new(EventVideos::EventId).integer().not_null().unique_key())
                    .col(ColumnDef::new(EventVideos::File).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_videos_event_id")
                            .from(EventVideos::Table, EventVideos::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventVideos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EventVideos {
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
