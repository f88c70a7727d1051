use catalog_core::{
    Catalog, CatalogSnapshot, CountTicket, Counted, FetchRequest, FetchTicket, Operation, Product,
    ProductId, ProductsClient, RequestStatus, count_products, create_and_count, fetch_page,
    remove_and_count, replace_product,
};
use iced::widget::{
    Column, Row, button, center, checkbox, column, container, mouse_area, opaque, row,
    scrollable, stack, text, text_input,
};
use iced::{Border, Color, Element, Length, Task};
use time::OffsetDateTime;

use crate::form::{FormField, ProductForm};

// Product grid layout
const GRID_COLUMNS: usize = 3;
const CARD_WIDTH: f32 = 300.0;
const DIALOG_WIDTH: f32 = 520.0;

const ERROR_COLOR: Color = Color {
    r: 0.8,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};
const MUTED_COLOR: Color = Color {
    r: 0.4,
    g: 0.4,
    b: 0.4,
    a: 1.0,
};
const AVAILABLE_COLOR: Color = Color {
    r: 0.1,
    g: 0.55,
    b: 0.2,
    a: 1.0,
};

/// Which modal is open, and the data it works on.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    Add(ProductForm),
    Edit { id: ProductId, form: ProductForm },
    View(Product),
    ConfirmDelete(Product),
}

#[derive(Debug, Clone)]
pub enum Message {
    // List lifecycle
    PageLoaded(FetchTicket, Result<Vec<Product>, String>),
    CountLoaded(CountTicket, Result<usize, String>),
    PrevPage,
    NextPage,
    Retry,

    // Dialogs
    OpenAdd,
    OpenView(ProductId),
    EditSelected,
    DeleteSelected,
    CancelDelete,
    CloseDialog,
    FormChanged(FormField, String),
    AvailabilityToggled(bool),
    SubmitForm,
    ConfirmDelete,

    // Mutation results
    Created(Result<Counted<Product>, String>),
    Updated(Result<Product, String>),
    Deleted(Result<Counted<ProductId>, String>),
}

pub struct AppState {
    client: ProductsClient,
    catalog: Catalog,
    dialog: Option<Dialog>,
    is_submitting: bool,
}

impl AppState {
    pub fn new(client: ProductsClient) -> Self {
        Self {
            client,
            catalog: Catalog::new(),
            dialog: None,
            is_submitting: false,
        }
    }

    fn form_mut(&mut self) -> Option<&mut ProductForm> {
        match self.dialog.as_mut() {
            Some(Dialog::Add(form)) | Some(Dialog::Edit { form, .. }) => Some(form),
            _ => None,
        }
    }
}

pub fn initialize(client: ProductsClient) -> (AppState, Task<Message>) {
    let mut state = AppState::new(client);
    let task = reload_all(&mut state);
    (state, task)
}

fn fetch_task(client: &ProductsClient, request: FetchRequest) -> Task<Message> {
    log::debug!("Fetching page {} ({:?})", request.page, request.ticket);
    let client = client.clone();
    Task::perform(
        async move {
            fetch_page(&client, request.window)
                .await
                .map_err(|e| e.to_string())
        },
        move |result| Message::PageLoaded(request.ticket, result),
    )
}

fn count_task(client: &ProductsClient, ticket: CountTicket) -> Task<Message> {
    let client = client.clone();
    Task::perform(
        async move { count_products(&client).await.map_err(|e| e.to_string()) },
        move |result| Message::CountLoaded(ticket, result),
    )
}

/// Refresh the total count and the current page together.
fn reload_all(state: &mut AppState) -> Task<Message> {
    let ticket = state.catalog.begin_count();
    let request = state.catalog.begin_fetch();
    Task::batch([
        count_task(&state.client, ticket),
        fetch_task(&state.client, request),
    ])
}

pub fn update(state: &mut AppState, message: Message) -> Task<Message> {
    match message {
        Message::PageLoaded(ticket, result) => {
            if let Err(e) = &result {
                log::error!("Failed to fetch products: {}", e);
            }
            state.catalog.complete_fetch(ticket, result);
        }
        Message::CountLoaded(ticket, result) => match result {
            Ok(count) => {
                state.catalog.complete_count(ticket, count);
            }
            Err(e) => log::error!("Failed to fetch total product count: {}", e),
        },
        Message::PrevPage => {
            if let Some(request) = state.catalog.prev_page() {
                return fetch_task(&state.client, request);
            }
        }
        Message::NextPage => {
            if let Some(request) = state.catalog.next_page() {
                return fetch_task(&state.client, request);
            }
        }
        Message::Retry => return reload_all(state),
        Message::OpenAdd => {
            state.dialog = Some(Dialog::Add(ProductForm::new()));
        }
        Message::OpenView(id) => {
            if let Some(product) = state.catalog.product(id) {
                state.dialog = Some(Dialog::View(product.clone()));
            }
        }
        Message::EditSelected => {
            state.dialog = match state.dialog.take() {
                Some(Dialog::View(product)) => Some(Dialog::Edit {
                    id: product.id,
                    form: ProductForm::from_product(&product),
                }),
                other => other,
            };
        }
        Message::DeleteSelected => {
            state.dialog = match state.dialog.take() {
                Some(Dialog::View(product)) => Some(Dialog::ConfirmDelete(product)),
                other => other,
            };
        }
        Message::CancelDelete => {
            if !state.is_submitting {
                state.dialog = match state.dialog.take() {
                    Some(Dialog::ConfirmDelete(product)) => Some(Dialog::View(product)),
                    other => other,
                };
            }
        }
        Message::CloseDialog => {
            if !state.is_submitting {
                state.dialog = None;
            }
        }
        Message::FormChanged(field, value) => {
            if let Some(form) = state.form_mut() {
                form.set(field, value);
            }
        }
        Message::AvailabilityToggled(is_available) => {
            if let Some(form) = state.form_mut() {
                form.is_available = is_available;
            }
        }
        Message::SubmitForm => {
            if state.is_submitting {
                return Task::none();
            }
            let now = OffsetDateTime::now_utc();
            match state.dialog.as_mut() {
                Some(Dialog::Add(form)) => match form.to_draft(now) {
                    Ok(draft) => {
                        state.is_submitting = true;
                        let client = state.client.clone();
                        return Task::perform(
                            async move {
                                create_and_count(&client, &draft)
                                    .await
                                    .map_err(|e| e.to_string())
                            },
                            Message::Created,
                        );
                    }
                    Err(e) => form.error = Some(e),
                },
                Some(Dialog::Edit { id, form }) => match form.to_draft(now) {
                    Ok(draft) => {
                        state.is_submitting = true;
                        let client = state.client.clone();
                        let id = *id;
                        return Task::perform(
                            async move {
                                replace_product(&client, id, &draft)
                                    .await
                                    .map_err(|e| e.to_string())
                            },
                            Message::Updated,
                        );
                    }
                    Err(e) => form.error = Some(e),
                },
                _ => {}
            }
        }
        Message::ConfirmDelete => {
            if state.is_submitting {
                return Task::none();
            }
            if let Some(Dialog::ConfirmDelete(product)) = &state.dialog {
                state.is_submitting = true;
                let client = state.client.clone();
                let id = product.id;
                return Task::perform(
                    async move {
                        remove_and_count(&client, id)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::Deleted,
                );
            }
        }
        Message::Created(result) => {
            state.is_submitting = false;
            state.dialog = None;
            match result {
                Ok(counted) => {
                    let request = state.catalog.on_created(counted.value, counted.total_count);
                    return fetch_task(&state.client, request);
                }
                Err(e) => {
                    log::error!("Failed to add product: {}", e);
                    state.catalog.on_mutation_failed(Operation::Create, e);
                }
            }
        }
        Message::Updated(result) => {
            state.is_submitting = false;
            state.dialog = None;
            match result {
                Ok(product) => {
                    let request = state.catalog.on_updated(product);
                    return fetch_task(&state.client, request);
                }
                Err(e) => {
                    log::error!("Failed to update product: {}", e);
                    state.catalog.on_mutation_failed(Operation::Update, e);
                }
            }
        }
        Message::Deleted(result) => {
            state.is_submitting = false;
            state.dialog = None;
            match result {
                Ok(counted) => {
                    let request = state.catalog.on_deleted(counted.value, counted.total_count);
                    return fetch_task(&state.client, request);
                }
                Err(e) => {
                    log::error!("Failed to delete product: {}", e);
                    state.catalog.on_mutation_failed(Operation::Delete, e);
                }
            }
        }
    }

    Task::none()
}

pub fn view(state: &AppState) -> Element<'_, Message> {
    let snapshot = state.catalog.snapshot();

    let header = row![
        text("Products").size(28).width(Length::Fill),
        button("Add Product").on_press(Message::OpenAdd).padding(10),
    ]
    .spacing(10);

    let body: Element<Message> = match snapshot.status {
        RequestStatus::Loading => text("Loading...").size(18).into(),
        RequestStatus::Failed => column![
            text(format!(
                "Error: {}",
                snapshot.error.unwrap_or("Unknown error")
            ))
            .size(16)
            .color(ERROR_COLOR),
            button("Retry").on_press(Message::Retry).padding(5),
        ]
        .spacing(10)
        .into(),
        RequestStatus::Idle | RequestStatus::Succeeded => column![
            scrollable(product_grid(snapshot.items)).height(Length::Fill),
            page_navigation(&snapshot),
        ]
        .spacing(20)
        .into(),
    };

    let status_line = text(
        state
            .client
            .last_api_call()
            .map(|call| {
                let outcome = if call.status_code == 0 {
                    "no response".to_string()
                } else {
                    call.status_code.to_string()
                };
                format!("Last request: {} {} ({})", call.method, call.url, outcome)
            })
            .unwrap_or_else(|| format!("API: {}", state.client.base_url())),
    )
    .size(12)
    .color(MUTED_COLOR);

    let base = container(column![header, body, status_line].spacing(20))
        .padding(30)
        .width(Length::Fill)
        .height(Length::Fill);

    match &state.dialog {
        Some(dialog) => {
            let on_blur = match dialog {
                Dialog::ConfirmDelete(_) => Message::CancelDelete,
                _ => Message::CloseDialog,
            };
            modal(base, dialog_view(dialog, state.is_submitting), on_blur)
        }
        None => base.into(),
    }
}

fn product_grid(items: &[Product]) -> Element<'_, Message> {
    if items.is_empty() {
        return text("No products on this page.")
            .size(14)
            .color(MUTED_COLOR)
            .into();
    }

    let rows: Vec<Element<Message>> = items
        .chunks(GRID_COLUMNS)
        .map(|chunk| {
            let cards: Vec<Element<Message>> = chunk.iter().map(product_card).collect();
            Row::with_children(cards).spacing(20).into()
        })
        .collect();

    Column::with_children(rows).spacing(20).into()
}

fn product_card(product: &Product) -> Element<'_, Message> {
    container(
        column![
            text(&product.title).size(20),
            text(&product.description).size(14).color(MUTED_COLOR),
            row![
                text(format!("${}", product.price)).size(18),
                text(format!("Rating: {}/5", product.rating)).size(14),
            ]
            .spacing(20),
            button("View Details")
                .on_press(Message::OpenView(product.id))
                .width(Length::Fill)
                .padding(8),
        ]
        .spacing(8),
    )
    .padding(16)
    .width(Length::Fixed(CARD_WIDTH))
    .style(panel_style)
    .into()
}

fn page_navigation<'a>(snapshot: &CatalogSnapshot<'a>) -> Element<'a, Message> {
    row![
        button("Previous")
            .on_press_maybe(if snapshot.can_go_prev {
                Some(Message::PrevPage)
            } else {
                None
            })
            .padding(5),
        text(format!(
            "Page {} of {}",
            snapshot.current_page, snapshot.total_pages
        ))
        .size(14),
        button("Next")
            .on_press_maybe(if snapshot.can_go_next {
                Some(Message::NextPage)
            } else {
                None
            })
            .padding(5),
    ]
    .spacing(10)
    .into()
}

fn dialog_view(dialog: &Dialog, is_submitting: bool) -> Element<'_, Message> {
    let content = match dialog {
        Dialog::Add(form) => form_view("Add New Product", form, "Add Product", is_submitting),
        Dialog::Edit { form, .. } => {
            form_view("Edit Product", form, "Update Product", is_submitting)
        }
        Dialog::View(product) => details_view(product),
        Dialog::ConfirmDelete(product) => confirm_delete_view(product, is_submitting),
    };

    container(content)
        .padding(24)
        .width(Length::Fixed(DIALOG_WIDTH))
        .style(panel_style)
        .into()
}

fn form_view<'a>(
    title: &'a str,
    form: &'a ProductForm,
    submit_label: &'a str,
    is_submitting: bool,
) -> Element<'a, Message> {
    let input = |label: &'a str, field: FormField| -> Element<'a, Message> {
        column![
            text(label).size(13),
            text_input(label, form.value(field))
                .on_input(move |value| Message::FormChanged(field, value))
                .padding(8),
        ]
        .spacing(4)
        .into()
    };

    let mut content = column![
        text(title).size(22),
        input("Title", FormField::Title),
        input("Description", FormField::Description),
        row![
            input("Category", FormField::Category),
            input("Brand", FormField::Brand),
        ]
        .spacing(10),
        row![
            input("Price", FormField::Price),
            input("Rating", FormField::Rating),
            input("Stock", FormField::Stock),
        ]
        .spacing(10),
        checkbox("Available", form.is_available).on_toggle(Message::AvailabilityToggled),
    ]
    .spacing(12);

    if let Some(error) = &form.error {
        content = content.push(text(error).size(14).color(ERROR_COLOR));
    }

    content
        .push(
            row![
                button("Cancel").on_press(Message::CloseDialog).padding(8),
                button(if is_submitting { "Saving..." } else { submit_label })
                    .on_press_maybe(if is_submitting {
                        None
                    } else {
                        Some(Message::SubmitForm)
                    })
                    .padding(8),
            ]
            .spacing(10),
        )
        .into()
}

fn details_view(product: &Product) -> Element<'_, Message> {
    let detail = |label: &'static str, value: String| -> Element<'static, Message> {
        column![
            text(label).size(12).color(MUTED_COLOR),
            text(value).size(14),
        ]
        .spacing(2)
        .width(Length::FillPortion(1))
        .into()
    };

    let (availability, availability_color) = if product.is_available {
        ("Available", AVAILABLE_COLOR)
    } else {
        ("Out of Stock", ERROR_COLOR)
    };

    column![
        text("Product Details").size(22),
        text(&product.title).size(20),
        text(&product.description).size(14).color(MUTED_COLOR),
        row![
            detail("Category", product.category.clone()),
            detail("Brand", product.brand.clone()),
        ],
        row![
            detail("Price", format!("${}", product.price)),
            detail("Rating", format!("{}/5", product.rating)),
        ],
        row![
            detail("Stock", format!("{} units", product.stock)),
            column![
                text("Status").size(12).color(MUTED_COLOR),
                text(availability).size(14).color(availability_color),
            ]
            .spacing(2)
            .width(Length::FillPortion(1)),
        ],
        row![
            button("Close").on_press(Message::CloseDialog).padding(8),
            button("Delete").on_press(Message::DeleteSelected).padding(8),
            button("Edit").on_press(Message::EditSelected).padding(8),
        ]
        .spacing(10),
    ]
    .spacing(12)
    .into()
}

fn confirm_delete_view(product: &Product, is_submitting: bool) -> Element<'_, Message> {
    column![
        text("Delete Product").size(22),
        text(format!(
            "Are you sure you want to delete \"{}\"? This action cannot be undone.",
            product.title
        ))
        .size(14),
        row![
            button("Cancel").on_press(Message::CancelDelete).padding(8),
            button(if is_submitting { "Deleting..." } else { "Delete" })
                .on_press_maybe(if is_submitting {
                    None
                } else {
                    Some(Message::ConfirmDelete)
                })
                .padding(8),
        ]
        .spacing(10),
    ]
    .spacing(16)
    .into()
}

fn panel_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Color::WHITE.into()),
        border: Border {
            color: Color::from_rgb(0.85, 0.85, 0.85),
            width: 1.0,
            radius: 8.0.into(),
        },
        ..Default::default()
    }
}

/// Lay `content` over a dimmed `base`; clicking outside the content emits `on_blur`.
fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| {
                container::Style {
                    background: Some(
                        Color {
                            a: 0.6,
                            ..Color::BLACK
                        }
                        .into(),
                    ),
                    ..container::Style::default()
                }
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}
