//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. The booking overlap
//! exclusion constraint and the `btree_gist` extension are not visible to
//! Diesel; they only surface as constraint names in database errors.

diesel::table! {
    /// Marketplace accounts. `role` selects which profile table holds the
    /// role-specific data.
    users (id) {
        id -> Uuid,
        full_name -> Text,
        email -> Text,
        /// `customer` or `barber`.
        role -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Customer profiles, one per customer account.
    customer_profiles (id) {
        id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::table! {
    /// Barber profiles. `(shop_id, seat_number)` is unique, so a seat holds
    /// at most one barber.
    barber_profiles (id) {
        id -> Uuid,
        user_id -> Uuid,
        shop_id -> Nullable<Uuid>,
        seat_number -> Nullable<Int4>,
        is_available -> Bool,
        status -> Text,
        rating -> Float8,
        total_reviews -> Int4,
    }
}

diesel::table! {
    /// Shops. `owner_id` is unique: a barber owns at most one shop.
    shops (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Text,
        total_seats -> Int4,
        address -> Text,
        phone -> Nullable<Text>,
        email -> Nullable<Text>,
        /// JSON array of `{day, opens, closes}` windows.
        opening_hours -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Join requests; `(barber_id, shop_id)` is unique for all statuses.
    join_requests (id) {
        id -> Uuid,
        barber_id -> Uuid,
        shop_id -> Uuid,
        status -> Text,
        seat_number -> Nullable<Int4>,
        message -> Text,
        created_at -> Timestamptz,
        responded_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Bookings. Live rows (`pending`, `confirmed`) of one barber may not
    /// overlap; the exclusion constraint is `bookings_barber_slot_excl`.
    bookings (id) {
        id -> Uuid,
        customer_id -> Uuid,
        barber_id -> Uuid,
        shop_id -> Uuid,
        /// JSON array of service lines.
        services -> Jsonb,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        status -> Text,
        payment_status -> Text,
        /// Major currency units.
        total_amount -> Int8,
        notes -> Nullable<Text>,
        cancellation_reason -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One review per booking.
    reviews (id) {
        id -> Uuid,
        booking_id -> Uuid,
        barber_id -> Uuid,
        customer_id -> Uuid,
        rating -> Int2,
        comment -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Stored-value balances; `balance` is checked non-negative.
    wallets (user_id) {
        user_id -> Uuid,
        balance -> Int8,
        currency -> Text,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ledger entries; `reference` is unique.
    transactions (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Text,
        amount -> Int8,
        reference -> Text,
        status -> Text,
        booking_id -> Nullable<Uuid>,
        description -> Text,
        created_at -> Timestamptz,
        settled_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        recipient_id -> Uuid,
        kind -> Text,
        title -> Text,
        message -> Text,
        payload -> Jsonb,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(customer_profiles -> users (user_id));
diesel::joinable!(barber_profiles -> users (user_id));
diesel::joinable!(join_requests -> shops (shop_id));
diesel::joinable!(reviews -> bookings (booking_id));
diesel::joinable!(transactions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    customer_profiles,
    barber_profiles,
    shops,
    join_requests,
    bookings,
    reviews,
    wallets,
    transactions,
    notifications,
);
