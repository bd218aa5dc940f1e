//! Diesel table definitions mirroring `migrations/*_create_back_office`.
//!
//! Quantities are stored as integer thousandths (`*_milli` columns) and
//! amounts as whole GNF in `BIGINT`. Enum-like columns are `TEXT` holding the
//! domain's snake_case codes.

diesel::table! {
    users (id) {
        id -> Uuid,
        display_name -> Text,
        email -> Text,
        phone -> Nullable<Text>,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    restaurants (id) {
        id -> Uuid,
        name -> Text,
        notification_phone -> Nullable<Text>,
        notifications_enabled -> Bool,
        initial_cash -> Int8,
        initial_orange_money -> Int8,
        initial_card -> Int8,
        expiry_warning_days -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    memberships (restaurant_id, user_id) {
        restaurant_id -> Uuid,
        user_id -> Uuid,
        role -> Text,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    contacts (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        kind -> Text,
        name -> Text,
        phone -> Nullable<Text>,
        email -> Nullable<Text>,
        address -> Nullable<Text>,
        notes -> Nullable<Text>,
        active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    categories (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        kind -> Text,
        name -> Text,
        active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    expense_groups (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    products (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        name -> Text,
        category_id -> Nullable<Uuid>,
        unit_price -> Int8,
        active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    inventory_items (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        name -> Text,
        category_id -> Nullable<Uuid>,
        supplier_id -> Nullable<Uuid>,
        unit -> Text,
        quantity_milli -> Int8,
        min_stock_milli -> Int8,
        unit_cost -> Int8,
        shelf_life_days -> Nullable<Int4>,
        last_purchased_at -> Nullable<Timestamptz>,
        active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    stock_movements (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        item_id -> Uuid,
        kind -> Text,
        quantity_delta_milli -> Int8,
        unit_cost -> Nullable<Int8>,
        supplier_id -> Nullable<Uuid>,
        reason -> Nullable<Text>,
        batch_id -> Nullable<Uuid>,
        expense_id -> Nullable<Uuid>,
        created_by -> Uuid,
        occurred_at -> Timestamptz,
    }
}

diesel::table! {
    production_batches (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        product_id -> Uuid,
        quantity_produced_milli -> Int8,
        notes -> Nullable<Text>,
        produced_at -> Timestamptz,
        created_by -> Uuid,
    }
}

diesel::table! {
    batch_ingredients (batch_id, item_id) {
        batch_id -> Uuid,
        item_id -> Uuid,
        quantity_milli -> Int8,
    }
}

diesel::table! {
    sales (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        business_date -> Date,
        cash -> Int8,
        orange_money -> Int8,
        card -> Int8,
        total -> Int8,
        customer_id -> Nullable<Uuid>,
        notes -> Nullable<Text>,
        status -> Text,
        rejection_reason -> Nullable<Text>,
        created_by -> Uuid,
        reviewed_by -> Nullable<Uuid>,
        reviewed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    expenses (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        expense_date -> Date,
        amount -> Int8,
        method -> Text,
        category_id -> Uuid,
        group_id -> Nullable<Uuid>,
        supplier_id -> Nullable<Uuid>,
        description -> Nullable<Text>,
        purchase_item_id -> Nullable<Uuid>,
        purchase_quantity_milli -> Nullable<Int8>,
        status -> Text,
        rejection_reason -> Nullable<Text>,
        created_by -> Uuid,
        reviewed_by -> Nullable<Uuid>,
        reviewed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    debts (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        customer_id -> Uuid,
        sale_id -> Nullable<Uuid>,
        amount -> Int8,
        paid_amount -> Int8,
        status -> Text,
        due_date -> Nullable<Date>,
        description -> Nullable<Text>,
        written_off_reason -> Nullable<Text>,
        written_off_at -> Nullable<Timestamptz>,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    debt_payments (id) {
        id -> Uuid,
        debt_id -> Uuid,
        restaurant_id -> Uuid,
        amount -> Int8,
        method -> Text,
        paid_on -> Date,
        notes -> Nullable<Text>,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    bank_transactions (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        transaction_date -> Date,
        amount -> Int8,
        direction -> Text,
        method -> Text,
        reason -> Text,
        status -> Text,
        source_kind -> Nullable<Text>,
        source_id -> Nullable<Uuid>,
        description -> Nullable<Text>,
        created_by -> Uuid,
        confirmed_by -> Nullable<Uuid>,
        confirmed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    reconciliations (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        reconciliation_date -> Date,
        expected_cash -> Int8,
        expected_orange_money -> Int8,
        expected_card -> Int8,
        counted_cash -> Int8,
        counted_orange_money -> Int8,
        counted_card -> Int8,
        adjustments_posted -> Bool,
        notes -> Nullable<Text>,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(memberships -> restaurants (restaurant_id));
diesel::joinable!(memberships -> users (user_id));
diesel::joinable!(debts -> contacts (customer_id));
diesel::joinable!(expenses -> categories (category_id));
diesel::joinable!(debt_payments -> debts (debt_id));
diesel::joinable!(batch_ingredients -> production_batches (batch_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    restaurants,
    memberships,
    contacts,
    categories,
    expense_groups,
    products,
    inventory_items,
    stock_movements,
    production_batches,
    batch_ingredients,
    sales,
    expenses,
    debts,
    debt_payments,
    bank_transactions,
    reconciliations,
);
